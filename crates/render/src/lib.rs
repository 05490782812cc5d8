//! Rendering adapter: renderer-agnostic interface over the session's display state.
//!
//! # Invariants
//! - Renderers read a `DisplayState` and never touch the world.
//! - Contact markers are drawn only when enabled; the session already limits
//!   contacts to the simulating mode.
//!
//! Only text renderers live here. A 3-D backend would implement the same
//! trait without changing the hosts.

mod renderer;

pub use renderer::{DebugTextRenderer, Hud, HudRenderer, Marker, RenderView, Renderer};
