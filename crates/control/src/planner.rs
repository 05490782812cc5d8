use rigplay_common::{BodyId, CollisionPair};
use rigplay_kernel::{World, WorldError};

/// Errors from path planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    #[error("no path found: {0}")]
    NoPath(String),
    #[error("{what} has {actual} coordinates, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("coordinate {dof} is out of range for {count} DOFs")]
    InvalidDof { dof: usize, count: usize },
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Computes a joint-space path for a subset of one body's coordinates.
pub trait Planner {
    /// Waypoints from `start` to `goal`, both inclusive, over coordinates `dofs` of `body`.
    fn plan(
        &self,
        world: &dyn World,
        body: BodyId,
        dofs: &[usize],
        start: &[f64],
        goal: &[f64],
    ) -> Result<Vec<Vec<f64>>, PlannerError>;
}

/// Straight joint-space interpolation with box limits.
///
/// Refuses to plan when the body currently touches anything through an
/// active collision pair, or when any waypoint leaves the limits.
#[derive(Debug, Clone, PartialEq)]
pub struct StraightLinePlanner {
    /// Largest per-coordinate change between consecutive waypoints.
    pub max_step: f64,
    /// Optional `(lower, upper)` bound per planned coordinate.
    pub limits: Option<Vec<(f64, f64)>>,
}

impl Default for StraightLinePlanner {
    fn default() -> Self {
        Self {
            max_step: 0.1,
            limits: None,
        }
    }
}

impl Planner for StraightLinePlanner {
    fn plan(
        &self,
        world: &dyn World,
        body: BodyId,
        dofs: &[usize],
        start: &[f64],
        goal: &[f64],
    ) -> Result<Vec<Vec<f64>>, PlannerError> {
        let count = world.layout().count(body).map_err(WorldError::from)?;
        if let Some(&dof) = dofs.iter().find(|&&d| d >= count) {
            return Err(PlannerError::InvalidDof { dof, count });
        }
        for (what, len) in [("start", start.len()), ("goal", goal.len())] {
            if len != dofs.len() {
                return Err(PlannerError::DimensionMismatch {
                    what,
                    expected: dofs.len(),
                    actual: len,
                });
            }
        }
        if let Some(contact) = world
            .contacts()
            .iter()
            .find(|c| c.body == body && world.is_pair_active(CollisionPair::new(c.body, c.other)))
        {
            return Err(PlannerError::NoPath(format!(
                "start state touches {}",
                contact.other
            )));
        }

        let span = start
            .iter()
            .zip(goal)
            .map(|(a, b)| (b - a).abs())
            .fold(0.0, f64::max);
        let steps = if self.max_step > 0.0 {
            (span / self.max_step).ceil().max(1.0) as usize
        } else {
            1
        };

        let path: Vec<Vec<f64>> = (0..=steps)
            .map(|k| {
                let s = k as f64 / steps as f64;
                start.iter().zip(goal).map(|(a, b)| a + s * (b - a)).collect()
            })
            .collect();

        if let Some(limits) = &self.limits {
            for waypoint in &path {
                for (j, (&q, &(lo, hi))) in waypoint.iter().zip(limits).enumerate() {
                    if q < lo || q > hi {
                        return Err(PlannerError::NoPath(format!(
                            "coordinate {} reaches {q:.3} outside [{lo:.3}, {hi:.3}]",
                            dofs[j]
                        )));
                    }
                }
            }
        }

        tracing::debug!(%body, waypoints = path.len(), "straight-line path planned");
        Ok(path)
    }
}
