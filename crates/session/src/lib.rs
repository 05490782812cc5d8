//! Session: the play-state machine and tick driver that alternate between
//! simulating-and-baking and restoring baked frames, over one owned world.
//!
//! # Invariants
//! - Exactly one snapshot is baked per simulating tick, after the step loop.
//! - Paused ticks never touch the world or the history.
//! - Playback restores are pure coordinate overwrites.
//! - Mode transitions are total; commands never leave an undefined mode.

pub mod scene;
pub mod session;
pub mod state;

pub use scene::{ControlSpec, PlanSpec, Scene, SceneError, SceneSpec};
pub use session::{
    CommandOutcome, DisplayState, Ignored, Session, SessionConfig, SessionError, TickReport,
    steps_for_period,
};
pub use state::{PlayState, Transition};
