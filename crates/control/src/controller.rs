use crate::trajectory::Trajectory;

/// Errors from controller and trajectory construction or evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error("{what} has {actual} entries, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("coordinate {dof} is out of range for {count} DOFs")]
    InvalidDof { dof: usize, count: usize },
    #[error("limit {index} must be positive and finite, got {value}")]
    NonPositiveLimit { index: usize, value: f64 },
    #[error("trajectory needs at least one waypoint")]
    EmptyPath,
}

/// Torque source queried once per physics step while simulating.
///
/// The session treats implementations as a function of
/// (pose, velocity, time); any internal state is the controller's business.
pub trait Controller {
    /// Generalized forces for the controlled body.
    fn torques(
        &mut self,
        pose: &[f64],
        velocity: &[f64],
        time: f64,
    ) -> Result<Vec<f64>, ControlError>;
}

#[derive(Debug, Clone)]
struct Tracking {
    trajectory: Trajectory,
    start_time: f64,
    dofs: Vec<usize>,
}

#[derive(Debug, Clone)]
struct AnkleGains {
    dofs: Vec<usize>,
    kp: Vec<f64>,
    kd: Vec<f64>,
}

/// Joint-space PD controller with optional trajectory tracking.
///
/// Actuated coordinates are driven toward a reference pose: the pose given at
/// construction, overlaid with the trajectory's position on the trajectory
/// coordinates. Before the trajectory's start time the reference holds the
/// first waypoint; after its end it holds the last. Ankle coordinates use
/// their own gains. Everything else gets zero torque.
#[derive(Debug, Clone)]
pub struct PdController {
    desired: Vec<f64>,
    actuated: Vec<usize>,
    kp: Vec<f64>,
    kd: Vec<f64>,
    ankles: Option<AnkleGains>,
    tracking: Option<Tracking>,
}

impl PdController {
    /// `kp` and `kd` are full-length gain vectors indexed by coordinate.
    pub fn new(
        desired: Vec<f64>,
        actuated: Vec<usize>,
        kp: Vec<f64>,
        kd: Vec<f64>,
    ) -> Result<Self, ControlError> {
        let count = desired.len();
        check_len("kp", count, kp.len())?;
        check_len("kd", count, kd.len())?;
        check_dofs(&actuated, count)?;
        Ok(Self {
            desired,
            actuated,
            kp,
            kd,
            ankles: None,
            tracking: None,
        })
    }

    /// Give `dofs` their own gains, one entry per listed coordinate.
    pub fn with_ankles(
        mut self,
        dofs: Vec<usize>,
        kp: Vec<f64>,
        kd: Vec<f64>,
    ) -> Result<Self, ControlError> {
        check_len("ankle kp", dofs.len(), kp.len())?;
        check_len("ankle kd", dofs.len(), kd.len())?;
        check_dofs(&dofs, self.dof_count())?;
        self.ankles = Some(AnkleGains { dofs, kp, kd });
        Ok(self)
    }

    /// Track `trajectory` on `dofs`, starting at simulated time `start_time`.
    pub fn set_trajectory(
        &mut self,
        trajectory: Trajectory,
        start_time: f64,
        dofs: Vec<usize>,
    ) -> Result<(), ControlError> {
        check_len("trajectory coordinates", trajectory.dof_count(), dofs.len())?;
        check_dofs(&dofs, self.dof_count())?;
        tracing::info!(
            duration = trajectory.duration(),
            start_time,
            dofs = dofs.len(),
            "controller tracking trajectory"
        );
        self.tracking = Some(Tracking {
            trajectory,
            start_time,
            dofs,
        });
        Ok(())
    }

    pub fn clear_trajectory(&mut self) {
        self.tracking = None;
    }

    pub fn has_trajectory(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn dof_count(&self) -> usize {
        self.desired.len()
    }

    /// Reference pose at simulated time `time`.
    pub fn reference(&self, time: f64) -> Vec<f64> {
        let mut reference = self.desired.clone();
        if let Some(tracking) = &self.tracking {
            let position = tracking.trajectory.position(time - tracking.start_time);
            for (&dof, value) in tracking.dofs.iter().zip(position) {
                reference[dof] = value;
            }
        }
        reference
    }
}

impl Controller for PdController {
    fn torques(
        &mut self,
        pose: &[f64],
        velocity: &[f64],
        time: f64,
    ) -> Result<Vec<f64>, ControlError> {
        let count = self.dof_count();
        check_len("pose", count, pose.len())?;
        check_len("velocity", count, velocity.len())?;

        let reference = self.reference(time);
        let mut torques = vec![0.0; count];
        for &i in &self.actuated {
            torques[i] = self.kp[i] * (reference[i] - pose[i]) - self.kd[i] * velocity[i];
        }
        if let Some(ankles) = &self.ankles {
            for (k, &i) in ankles.dofs.iter().enumerate() {
                torques[i] = ankles.kp[k] * (reference[i] - pose[i]) - ankles.kd[k] * velocity[i];
            }
        }
        Ok(torques)
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ControlError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ControlError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}

fn check_dofs(dofs: &[usize], count: usize) -> Result<(), ControlError> {
    match dofs.iter().find(|&&dof| dof >= count) {
        Some(&dof) => Err(ControlError::InvalidDof { dof, count }),
        None => Ok(()),
    }
}
