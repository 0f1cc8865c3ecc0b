//! Keyframe Animation
//!
//! glTF-style animation playback: a [`AnimationClip`] holds keyframe tracks,
//! an [`AnimationAction`] plays one clip with its own time and loop mode,
//! and an [`AnimationMixer`] applies every action to the nodes under one
//! model root.
//!
//! ```rust,ignore
//! let mut mixer = AnimationMixer::new(model_root);
//! mixer.clip_action(clip, &scene).play();
//! // every frame
//! mixer.update(dt, &mut scene);
//! ```

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode, TrackValue};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use mixer::AnimationMixer;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
