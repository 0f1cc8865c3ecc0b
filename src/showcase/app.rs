use std::sync::{Arc, OnceLock};

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::window::Window;

use crate::app::input_adapter::translate_mouse_button;
use crate::app::winit::AppHandler;
use crate::engine::{Engine, FrameState};
use crate::renderer::FrameComposer;
use crate::showcase::config::ShowcaseConfig;
use crate::showcase::showcase::Showcase;
use crate::showcase::ui_pass::UiPass;
use crate::utils::FpsCounter;

/// Configuration picked up by [`ShowcaseApp::init`].
///
/// `AppHandler::init` only receives the engine and the window, so the binary
/// stores its config here before starting the event loop.
static CONFIG: OnceLock<ShowcaseConfig> = OnceLock::new();

/// Winit handler running the car showcase.
pub struct ShowcaseApp {
    showcase: Showcase,
    ui_pass: Option<UiPass>,
    fps: FpsCounter,
    title: String,
}

impl ShowcaseApp {
    /// Sets the configuration used by every instance. Only the first call
    /// has an effect; returns `false` for later ones.
    #[must_use]
    pub fn configure(config: ShowcaseConfig) -> bool {
        CONFIG.set(config).is_ok()
    }

    fn config() -> ShowcaseConfig {
        CONFIG.get().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }
}

impl AppHandler for ShowcaseApp {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
        let mut showcase = Showcase::new(Self::config(), &mut engine.scene);

        let (width, height) = engine.size();
        let scale_factor = window.scale_factor() as f32;
        engine.resize(width, height, scale_factor);

        showcase.begin_load(&engine.assets);

        let ui_pass = match (engine.renderer.wgpu_ctx(), engine.renderer.surface_format()) {
            (Some(ctx), Some(format)) => Some(UiPass::new(&ctx.device, format, window)),
            _ => {
                log::warn!("Renderer not initialized, debug panel disabled");
                None
            }
        };

        Self {
            showcase,
            ui_pass,
            fps: FpsCounter::new(),
            title: window.title(),
        }
    }

    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        let consumed = self
            .ui_pass
            .as_mut()
            .is_some_and(|ui| ui.handle_input(window, event));

        match event {
            WindowEvent::Resized(size) => {
                if let Some(ui) = &mut self.ui_pass {
                    ui.resize(size.width, size.height, window.scale_factor() as f32);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (width, height) = engine.size();
                self.showcase.on_pointer_move(
                    Vec2::new(position.x as f32, position.y as f32),
                    Vec2::new(width as f32, height as f32),
                    window.scale_factor() as f32,
                );
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } if !consumed => {
                self.showcase.on_mouse_down(translate_mouse_button(*button));
            }
            _ => {}
        }

        consumed
    }

    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {
        if let Some(fps) = self.fps.update() {
            window.set_title(&format!("{} | FPS: {fps:.0}", self.title));
        }

        let Engine { scene, input, .. } = engine;
        self.showcase.poll_load(scene);
        self.showcase.tick(scene, input, frame.dt);

        if let Some(ui) = &mut self.ui_pass {
            ui.begin_frame(window);
            self.showcase.show_panel(ui.context(), scene);
            ui.end_frame(window);
        }
    }

    fn compose_frame<'a>(&'a mut self, composer: FrameComposer<'a>) {
        match &mut self.ui_pass {
            Some(ui) => composer.add_node(ui).render(),
            None => composer.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_configuration_wins() {
        let first = ShowcaseConfig::default().with_model_source("first.glb");
        let second = ShowcaseConfig::default().with_model_source("second.glb");

        // Nothing else in this binary configures the handler
        assert!(ShowcaseApp::configure(first));
        assert!(!ShowcaseApp::configure(second));
        assert_eq!(ShowcaseApp::config().model_source, "first.glb");
    }
}
