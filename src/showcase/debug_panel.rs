//! Debug Panel
//!
//! A small declarative model of the live-tweak panel: folders of controls,
//! each bound to one attribute of the loaded model's root node. The model
//! is independent of egui so it can be inspected in tests;
//! [`DebugPanel::show`] draws it.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::scene::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// Node attribute a control edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlBinding {
    /// Euler angle in radians, XYZ order.
    Rotation(Axis),
    Position(Axis),
    Scale(Axis),
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32 },
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: String,
    pub binding: ControlBinding,
    pub kind: ControlKind,
}

impl Control {
    #[must_use]
    pub fn slider(label: impl Into<String>, binding: ControlBinding, min: f32, max: f32) -> Self {
        Self {
            label: label.into(),
            binding,
            kind: ControlKind::Slider { min, max },
        }
    }

    #[must_use]
    pub fn toggle(label: impl Into<String>, binding: ControlBinding) -> Self {
        Self {
            label: label.into(),
            binding,
            kind: ControlKind::Toggle,
        }
    }

    /// Current value of the bound attribute. Rotation comes from `euler`,
    /// the angles the panel last wrote, not from the node's quaternion.
    #[must_use]
    pub fn read(&self, node: &Node, euler: Vec3) -> ControlValue {
        let t = &node.transform;
        match self.binding {
            ControlBinding::Rotation(axis) => ControlValue::Number(euler[axis.index()]),
            ControlBinding::Position(axis) => ControlValue::Number(t.position[axis.index()]),
            ControlBinding::Scale(axis) => ControlValue::Number(t.scale[axis.index()]),
            ControlBinding::Visibility => ControlValue::Flag(node.visible),
        }
    }

    /// Writes `value` to the bound attribute, clamped to the slider range.
    /// Values of the wrong kind are ignored.
    pub fn write(&self, node: &mut Node, euler: &mut Vec3, value: ControlValue) {
        let number = match (self.kind, value) {
            (ControlKind::Slider { min, max }, ControlValue::Number(v)) => v.clamp(min, max),
            (ControlKind::Toggle, ControlValue::Flag(flag)) => {
                if self.binding == ControlBinding::Visibility {
                    node.visible = flag;
                }
                return;
            }
            _ => return,
        };

        let t = &mut node.transform;
        match self.binding {
            ControlBinding::Rotation(axis) => {
                euler[axis.index()] = number;
                t.set_rotation_euler(euler.x, euler.y, euler.z);
            }
            ControlBinding::Position(axis) => t.position[axis.index()] = number,
            ControlBinding::Scale(axis) => t.scale[axis.index()] = number,
            ControlBinding::Visibility => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub title: String,
    /// Whether the folder starts expanded.
    pub open: bool,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugPanel {
    pub folders: Vec<Folder>,
}

impl DebugPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&mut self, folder: Folder) {
        self.folders.push(folder);
    }

    #[must_use]
    pub fn folder(&self, title: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.title == title)
    }

    #[must_use]
    pub fn control_count(&self) -> usize {
        self.folders.iter().map(|f| f.controls.len()).sum()
    }

    /// Rotation, position and scale sliders for each axis plus a visibility
    /// toggle.
    #[must_use]
    pub fn car_model_folder(title: impl Into<String>, open: bool) -> Folder {
        let mut controls = Vec::with_capacity(10);
        for axis in Axis::ALL {
            controls.push(Control::slider(
                format!("Rotate {}", axis.label()),
                ControlBinding::Rotation(axis),
                0.0,
                TAU,
            ));
        }
        for axis in Axis::ALL {
            controls.push(Control::slider(
                format!("Position {}", axis.label()),
                ControlBinding::Position(axis),
                -10.0,
                10.0,
            ));
        }
        for axis in Axis::ALL {
            controls.push(Control::slider(
                format!("Scale {}", axis.label()),
                ControlBinding::Scale(axis),
                0.1,
                5.0,
            ));
        }
        controls.push(Control::toggle("Visibility", ControlBinding::Visibility));

        Folder {
            title: title.into(),
            open,
            controls,
        }
    }

    /// Draws the panel and applies edits to `node`. Returns `true` when any
    /// control changed this frame.
    pub fn show(&mut self, ctx: &egui::Context, node: &mut Node, euler: &mut Vec3) -> bool {
        if self.folders.is_empty() {
            return false;
        }

        let mut changed = false;
        egui::Window::new("Controls")
            .default_pos([10.0, 10.0])
            .default_width(280.0)
            .resizable(false)
            .show(ctx, |ui| {
                for folder in &mut self.folders {
                    let response = egui::CollapsingHeader::new(&folder.title)
                        .default_open(folder.open)
                        .show(ui, |ui| {
                            let mut folder_changed = false;
                            for control in &folder.controls {
                                folder_changed |= show_control(ui, control, node, euler);
                            }
                            folder_changed
                        });
                    folder.open = response.openness > 0.5;
                    changed |= response.body_returned.unwrap_or(false);
                }
            });
        changed
    }
}

fn show_control(ui: &mut egui::Ui, control: &Control, node: &mut Node, euler: &mut Vec3) -> bool {
    match (control.kind, control.read(node, *euler)) {
        (ControlKind::Slider { min, max }, ControlValue::Number(mut value)) => {
            let changed = ui
                .add(
                    egui::Slider::new(&mut value, min..=max)
                        // Only user edits are clamped; the loaded value is shown as is
                        .clamping(egui::SliderClamping::Edits)
                        .text(&control.label),
                )
                .changed();
            if changed {
                control.write(node, euler, ControlValue::Number(value));
            }
            changed
        }
        (ControlKind::Toggle, ControlValue::Flag(mut flag)) => {
            let changed = ui.checkbox(&mut flag, &control.label).changed();
            if changed {
                control.write(node, euler, ControlValue::Flag(flag));
            }
            changed
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_folder_has_ten_labelled_controls() {
        let folder = DebugPanel::car_model_folder("Car Model", true);
        let labels: Vec<&str> = folder.controls.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Rotate X", "Rotate Y", "Rotate Z", "Position X", "Position Y", "Position Z",
                "Scale X", "Scale Y", "Scale Z", "Visibility",
            ]
        );
        assert!(folder.open);
    }

    #[test]
    fn slider_writes_are_clamped() {
        let control = Control::slider("Scale X", ControlBinding::Scale(Axis::X), 0.1, 5.0);
        let mut node = Node::new();
        let mut euler = Vec3::ZERO;

        control.write(&mut node, &mut euler, ControlValue::Number(9.0));
        assert_eq!(node.transform.scale.x, 5.0);

        control.write(&mut node, &mut euler, ControlValue::Number(-1.0));
        assert_eq!(node.transform.scale.x, 0.1);
    }

    #[test]
    fn rotation_reads_back_the_written_angle() {
        let control = Control::slider("Rotate Y", ControlBinding::Rotation(Axis::Y), 0.0, TAU);
        let mut node = Node::new();
        let mut euler = Vec3::ZERO;

        control.write(&mut node, &mut euler, ControlValue::Number(5.5));
        assert_eq!(control.read(&node, euler), ControlValue::Number(5.5));
        assert!((node.transform.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mismatched_value_kind_is_ignored() {
        let control = Control::toggle("Visibility", ControlBinding::Visibility);
        let mut node = Node::new();
        let mut euler = Vec3::ZERO;

        control.write(&mut node, &mut euler, ControlValue::Number(0.0));
        assert!(node.visible);

        control.write(&mut node, &mut euler, ControlValue::Flag(false));
        assert!(!node.visible);
    }
}
