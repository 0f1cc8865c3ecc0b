//! Winit-based Application Framework
//!
//! - [`App`]: builder for configuring and launching the viewer
//! - [`AppHandler`]: trait the application implements
//! - `AppRunner`: the internal winit `ApplicationHandler`
//!
//! The runner redraws continuously: every `RedrawRequested` updates the
//! handler and the engine, renders a frame and immediately requests the
//! next one.
//!
//! ```rust,ignore
//! use parallax::app::winit::{App, AppHandler};
//!
//! struct Viewer;
//!
//! impl AppHandler for Viewer {
//!     fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
//!         Viewer
//!     }
//! }
//!
//! fn main() -> parallax::errors::Result<()> {
//!     App::new().with_title("Viewer").run::<Viewer>()
//! }
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::app::input_adapter;
use crate::engine::{Engine, FrameState};
use crate::renderer::FrameComposer;
use crate::renderer::settings::RenderSettings;
use crate::utils::Timer;

/// Default DOM id of the canvas the viewer renders into on the web.
pub const DEFAULT_CANVAS_ID: &str = "parallax-canvas";

/// Application behaviour plugged into the runner.
///
/// # Lifecycle
///
/// 1. [`init`](Self::init) once the window and GPU are ready
/// 2. [`on_event`](Self::on_event) for each window event
/// 3. [`update`](Self::update) each frame before rendering
/// 4. [`compose_frame`](Self::compose_frame) to add render nodes
pub trait AppHandler: Sized + 'static {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self;

    /// Called before the engine sees the event. Return `true` to consume it.
    #[allow(unused_variables)]
    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        false
    }

    #[allow(unused_variables)]
    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {}

    /// Adds extra render nodes (overlays) after the scene pass.
    fn compose_frame<'a>(&'a mut self, composer: FrameComposer<'a>) {
        composer.render();
    }
}

/// Application builder.
///
/// ```rust,ignore
/// App::new()
///     .with_title("Car Showcase")
///     .with_settings(RenderSettings { vsync: false, ..Default::default() })
///     .run::<ShowcaseApp>()?;
/// ```
pub struct App {
    title: String,
    render_settings: RenderSettings,
    #[cfg(target_arch = "wasm32")]
    canvas_id: Option<String>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Parallax Viewer".into(),
            render_settings: RenderSettings::default(),
            #[cfg(target_arch = "wasm32")]
            canvas_id: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.render_settings = settings;
        self
    }

    /// DOM id of the canvas to render into. The canvas is created and
    /// appended to the page body when no element has this id.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn with_canvas_id(mut self, id: impl Into<String>) -> Self {
        self.canvas_id = Some(id.into());
        self
    }

    /// Runs the event loop on the current thread until the window closes.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self.title, self.render_settings);
        event_loop.run_app(&mut runner)?;
        Ok(())
    }

    /// Hands the event loop to the browser and returns immediately.
    #[cfg(target_arch = "wasm32")]
    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        use winit::platform::web::EventLoopExtWebSys;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let runner = AppRunner::<H>::new(self.title, self.render_settings, self.canvas_id);
        event_loop.spawn_app(runner);

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H: AppHandler> {
    title: String,
    render_settings: RenderSettings,

    #[cfg(target_arch = "wasm32")]
    canvas_id: Option<String>,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    user_state: Option<H>,

    timer: Timer,

    #[cfg(target_arch = "wasm32")]
    init_state: std::rc::Rc<std::cell::RefCell<WasmInitState<H>>>,
}

/// Hand-off slot for the async GPU initialisation on the web.
#[cfg(target_arch = "wasm32")]
struct WasmInitState<H: AppHandler> {
    result: Option<(Engine, H)>,
}

#[cfg(target_arch = "wasm32")]
impl<H: AppHandler> Default for WasmInitState<H> {
    fn default() -> Self {
        Self { result: None }
    }
}

impl<H: AppHandler> AppRunner<H> {
    fn new(
        title: String,
        render_settings: RenderSettings,
        #[cfg(target_arch = "wasm32")] canvas_id: Option<String>,
    ) -> Self {
        Self {
            title,
            render_settings,
            #[cfg(target_arch = "wasm32")]
            canvas_id,

            window: None,
            engine: None,
            user_state: None,
            timer: Timer::new(),
            #[cfg(target_arch = "wasm32")]
            init_state: std::rc::Rc::new(std::cell::RefCell::new(WasmInitState::default())),
        }
    }

    fn update_logic(&mut self) {
        self.timer.tick();
        let total_time = self.timer.elapsed_seconds();
        let dt = self.timer.dt_seconds();

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let frame_state = FrameState {
            time: total_time,
            dt,
            frame_count: engine.frame_count(),
        };

        user_state.update(engine, window, &frame_state);
        engine.update(dt);
    }

    fn render_frame(&mut self) {
        let (Some(engine), Some(user_state)) = (&mut self.engine, &mut self.user_state) else {
            return;
        };

        if let Some(composer) = engine.renderer.begin_frame(&engine.scene) {
            user_state.compose_frame(composer);
        }
    }

    fn redraw(&mut self) {
        self.update_logic();
        self.render_frame();
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn finish_wasm_init(&mut self) -> bool {
        if self.engine.is_some() {
            return true;
        }

        let Some((mut engine, user_state)) = self
            .init_state
            .try_borrow_mut()
            .ok()
            .and_then(|mut state| state.result.take())
        else {
            return false;
        };

        if let Some(window) = &self.window {
            let size = window.inner_size();
            engine.resize(
                size.width.max(1),
                size.height.max(1),
                window.scale_factor() as f32,
            );
        }

        self.engine = Some(engine);
        self.user_state = Some(user_state);
        log::info!("Engine initialization completed, starting render loop");
        true
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    #[cfg(not(target_arch = "wasm32"))]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing Renderer Backend...");

        let mut engine = Engine::new(self.render_settings.clone());
        let size = window.inner_size();

        if let Err(e) = pollster::block_on(engine.init(window.clone(), size.width, size.height)) {
            log::error!("Fatal Renderer Error: {e}");
            event_loop.exit();
            return;
        }
        engine.resize(size.width, size.height, window.scale_factor() as f32);

        self.user_state = Some(H::init(&mut engine, &window));
        self.engine = Some(engine);

        self.timer = Timer::new();
    }

    #[cfg(target_arch = "wasm32")]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        use winit::platform::web::WindowAttributesExtWebSys;

        if self.window.is_some() {
            return;
        }

        let canvas_id = self.canvas_id.as_deref().unwrap_or(DEFAULT_CANVAS_ID);
        let canvas = match web::acquire_canvas(canvas_id) {
            Ok(canvas) => canvas,
            Err(e) => {
                log::error!("Cannot set up canvas '{canvas_id}': {e}");
                event_loop.exit();
                return;
            }
        };

        // prevent_default also keeps the browser context menu away from the canvas
        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_canvas(Some(canvas))
            .with_prevent_default(true);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing WebGPU Renderer Backend...");

        // requestAdapter is async on the web, so initialisation completes later
        let render_settings = self.render_settings.clone();
        let init_state = self.init_state.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let mut engine = Engine::new(render_settings);
            let size = window.inner_size();

            match engine.init(window.clone(), size.width.max(1), size.height.max(1)).await {
                Ok(()) => {
                    log::info!("WebGPU initialization successful");
                    let user_state = H::init(&mut engine, &window);
                    init_state.borrow_mut().result = Some((engine, user_state));
                    window.request_redraw();
                }
                Err(e) => log::error!("Fatal Renderer Error: {e}"),
            }
        });

        self.timer = Timer::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        if !self.finish_wasm_init() {
            return;
        }

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let consumed = user_state.on_event(engine, window, &event);

        if !consumed {
            input_adapter::process_window_event(&mut engine.input, &event);
        }

        match event {
            WindowEvent::CloseRequested if !consumed => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                let scale_factor = window.scale_factor() as f32;
                engine.resize(physical_size.width, physical_size.height, scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.engine.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;

    use crate::errors::{Result, ViewerError};

    fn js_err(e: wasm_bindgen::JsValue) -> ViewerError {
        ViewerError::Wasm(format!("{e:?}"))
    }

    /// Finds the canvas with `id`, or creates a full-window one.
    pub(super) fn acquire_canvas(id: &str) -> Result<web_sys::HtmlCanvasElement> {
        let window = web_sys::window().ok_or_else(|| ViewerError::Wasm("no global `window`".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ViewerError::Wasm("no document".into()))?;

        let canvas = if let Some(element) = document.get_element_by_id(id) {
            element
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .map_err(|_| ViewerError::Wasm(format!("element '{id}' is not a canvas")))?
        } else {
            let canvas = document
                .create_element("canvas")
                .map_err(js_err)?
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .map_err(|_| ViewerError::Wasm("created element is not a canvas".into()))?;
            canvas.set_id(id);
            canvas
                .set_attribute("style", "display:block;width:100vw;height:100vh")
                .map_err(js_err)?;
            document
                .body()
                .ok_or_else(|| ViewerError::Wasm("document has no body".into()))?
                .append_child(&canvas)
                .map_err(js_err)?;
            canvas
        };

        canvas.set_attribute("tabindex", "0").map_err(js_err)?;
        // Focus is best-effort
        let _ = canvas.focus();

        let dpr = window.device_pixel_ratio();
        canvas.set_width((f64::from(canvas.client_width()) * dpr) as u32);
        canvas.set_height((f64::from(canvas.client_height()) * dpr) as u32);

        Ok(canvas)
    }
}
