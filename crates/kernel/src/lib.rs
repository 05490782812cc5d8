//! World kernel: the contract the playback core needs from a physics world,
//! plus a small reference world that honors it.
//!
//! # Invariants
//! - The DOF layout is fixed when the world is built.
//! - `set_pose` with [`PoseUpdate::OVERWRITE`] writes coordinates only: no
//!   velocity integration, no contact refresh.
//! - All state mutations flow through explicit operations.

pub mod articulated;
pub mod filter;
pub mod world;

pub use articulated::{ArticulatedWorld, BodySpec, GroundContact, WorldParams};
pub use filter::CollisionFilter;
pub use world::{PoseUpdate, World, WorldError};
