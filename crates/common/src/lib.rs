//! Shared types for rigplay: body ids, play modes, generalized-coordinate layout, contacts.
//!
//! # Invariants
//! - A `DofLayout` is computed once per world and never changes afterwards.
//! - Every flat coordinate vector for a world has length `DofLayout::total()`.

pub mod layout;
pub mod types;

pub use layout::{DofLayout, LayoutError};
pub use types::{BodyId, CollisionPair, Contact, PlayMode};
