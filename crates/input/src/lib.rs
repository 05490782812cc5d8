//! Keyboard surface: discrete viewer commands and the keys bound to them.
//!
//! # Invariants
//! - Every command has at least one key in the default keymap.
//! - The session consumes commands, never raw key codes.

pub mod action;
pub mod keymap;

pub use action::Command;
pub use keymap::Keymap;
