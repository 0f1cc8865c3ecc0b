use std::sync::Arc;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

/// Drives the animation actions of one model root.
pub struct AnimationMixer {
    root: NodeHandle,
    actions: Vec<AnimationAction>,
    /// Global speed multiplier applied on top of each action's own scale.
    pub time_scale: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: Vec::new(),
            time_scale: 1.0,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the action for `clip`, binding a new one against the root's
    /// subtree on first use.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>, scene: &Scene) -> &mut AnimationAction {
        if let Some(index) = self
            .actions
            .iter()
            .position(|a| Arc::ptr_eq(a.clip(), &clip) || a.clip().name == clip.name)
        {
            return &mut self.actions[index];
        }

        let bindings = Binder::bind(scene, self.root, &clip);
        log::debug!(
            "Bound clip '{}': {}/{} tracks",
            clip.name,
            bindings.len(),
            clip.tracks.len()
        );
        self.actions.push(AnimationAction::new(clip, bindings));
        let last = self.actions.len() - 1;
        &mut self.actions[last]
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[must_use]
    pub fn action(&self, clip_name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.clip().name == clip_name)
    }

    /// Advances every action by `dt` seconds and writes the sampled
    /// transforms onto the bound nodes.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let dt = dt * self.time_scale;

        for action in &mut self.actions {
            action.update(dt);
        }

        for action in &mut self.actions {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }

            for b in 0..action.bindings.len() {
                let binding = action.bindings[b];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };

                match (binding.target, value) {
                    (TargetPath::Translation, TrackValue::Vector3(v)) => node.transform.position = v,
                    (TargetPath::Scale, TrackValue::Vector3(v)) => node.transform.scale = v,
                    (TargetPath::Rotation, TrackValue::Quaternion(q)) => node.transform.rotation = q,
                    _ => continue,
                }
                node.transform.mark_dirty();
            }
        }
    }
}
