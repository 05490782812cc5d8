use glam::Vec3;
use rigplay_common::Contact;
use rigplay_session::DisplayState;
use std::fmt::Write;

/// Camera configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// World up axis.
    pub up: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(2.0, -2.0, 2.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov_degrees: 60.0,
        }
    }
}

/// Renderer-agnostic interface over the session's display state.
///
/// Renderers only ever see a [`DisplayState`]; they cannot reach the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, state: &DisplayState, view: &RenderView) -> Self::Output;
}

/// One contact drawn as a point plus its normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub point: Vec3,
    pub normal: Vec3,
}

impl From<&Contact> for Marker {
    fn from(contact: &Contact) -> Self {
        Self {
            point: contact.point.as_vec3(),
            normal: contact.normal.as_vec3(),
        }
    }
}

/// Heads-up display text for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    /// "Simulating", "Playing" or blank while paused.
    pub label: String,
    pub sim_frame: String,
    pub play_frame: String,
    pub markers: Vec<Marker>,
}

impl std::fmt::Display for Hud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.label)?;
        writeln!(f, "{}", self.sim_frame)?;
        writeln!(f, "{}", self.play_frame)?;
        for m in &self.markers {
            writeln!(
                f,
                "  contact ({:.3}, {:.3}, {:.3}) n=({:.2}, {:.2}, {:.2})",
                m.point.x, m.point.y, m.point.z, m.normal.x, m.normal.y, m.normal.z
            )?;
        }
        Ok(())
    }
}

/// Builds the HUD: mode label, frame counters and contact markers.
#[derive(Debug, Default)]
pub struct HudRenderer;

impl HudRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for HudRenderer {
    type Output = Hud;

    fn render(&self, state: &DisplayState, _view: &RenderView) -> Hud {
        let markers = if state.show_markers {
            state.contacts.iter().map(Marker::from).collect()
        } else {
            Vec::new()
        };
        Hud {
            label: state.mode.label().to_string(),
            sim_frame: format!("Sim Frame: {}", state.sim_frame),
            play_frame: format!("Play Frame: {}", state.play_frame),
            markers,
        }
    }
}

/// Debug dump of the display state and camera, for logs and scripted runs.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, state: &DisplayState, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== {} (t={:.3}s, history={}) ===",
            state.mode, state.sim_time, state.history_len
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) up=({:.0}, {:.0}, {:.0}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.up.x,
            view.up.y,
            view.up.z,
            view.fov_degrees
        );
        out.push_str(&HudRenderer.render(state, view).to_string());
        out
    }
}
