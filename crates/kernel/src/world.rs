use rigplay_common::{BodyId, CollisionPair, Contact, DofLayout, LayoutError};

/// Errors from world operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("{body} expects {expected} values, got {actual}")]
    WrongLength {
        body: BodyId,
        expected: usize,
        actual: usize,
    },
    #[error("invalid body `{name}`: {reason}")]
    InvalidBody { name: String, reason: String },
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),
}

/// How a pose write interacts with the rest of the body state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoseUpdate {
    /// Derive velocities from the coordinate change over one timestep.
    pub integrate_velocity: bool,
    /// Refresh derived quantities (contacts) for the body after the write.
    pub recompute_derived: bool,
}

impl PoseUpdate {
    /// Pure coordinate overwrite. Used when restoring baked snapshots.
    pub const OVERWRITE: Self = Self {
        integrate_velocity: false,
        recompute_derived: false,
    };

    /// Write coordinates and bring velocities and contacts along.
    pub const FULL: Self = Self {
        integrate_velocity: true,
        recompute_derived: true,
    };
}

/// A world of articulated bodies advanced in fixed timesteps.
///
/// This is the whole surface the session touches. Bodies are addressed by
/// their position in [`World::layout`]; per-body vectors have that body's DOF
/// count.
pub trait World {
    /// Per-body offset table used to lay out flat snapshots.
    fn layout(&self) -> &DofLayout;

    /// Fixed physics timestep in seconds.
    fn timestep(&self) -> f64;

    /// Simulated time in seconds.
    fn time(&self) -> f64;

    /// Advance one fixed timestep.
    fn step_once(&mut self);

    /// Generalized coordinates of one body.
    fn pose(&self, body: BodyId) -> Result<&[f64], WorldError>;

    /// Generalized velocities of one body.
    fn velocity(&self, body: BodyId) -> Result<&[f64], WorldError>;

    /// Overwrite one body's generalized coordinates.
    fn set_pose(&mut self, body: BodyId, pose: &[f64], update: PoseUpdate)
    -> Result<(), WorldError>;

    /// Generalized forces applied to one body on every following step.
    fn set_internal_forces(&mut self, body: BodyId, forces: &[f64]) -> Result<(), WorldError>;

    /// Enable or disable collision checking between two bodies.
    fn set_pair_active(&mut self, pair: CollisionPair, active: bool);

    fn is_pair_active(&self, pair: CollisionPair) -> bool;

    /// Contacts found by the last step.
    fn contacts(&self) -> &[Contact];
}

/// Check a per-body vector against the body's DOF count.
pub(crate) fn check_body_len(
    layout: &DofLayout,
    body: BodyId,
    actual: usize,
) -> Result<(), WorldError> {
    let expected = layout.count(body)?;
    if expected == actual {
        Ok(())
    } else {
        Err(WorldError::WrongLength {
            body,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_clears_both_flags() {
        assert!(!PoseUpdate::OVERWRITE.integrate_velocity);
        assert!(!PoseUpdate::OVERWRITE.recompute_derived);
        assert_eq!(PoseUpdate::default(), PoseUpdate::OVERWRITE);
    }

    #[test]
    fn body_length_check() {
        let layout = DofLayout::new([3, 1]);
        assert!(check_body_len(&layout, BodyId(0), 3).is_ok());
        assert_eq!(
            check_body_len(&layout, BodyId(1), 2),
            Err(WorldError::WrongLength {
                body: BodyId(1),
                expected: 1,
                actual: 2
            })
        );
        assert!(matches!(
            check_body_len(&layout, BodyId(2), 0),
            Err(WorldError::Layout(LayoutError::UnknownBody(_)))
        ));
    }
}
