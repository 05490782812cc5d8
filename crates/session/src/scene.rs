use rigplay_common::{BodyId, CollisionPair};
use rigplay_control::{ControlError, PdController, Planner, StraightLinePlanner, Trajectory};
use rigplay_kernel::{ArticulatedWorld, BodySpec, PoseUpdate, World, WorldError, WorldParams};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

/// Errors while loading or building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read scene {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world: {0}")]
    World(#[from] WorldError),
    #[error("controller: {0}")]
    Control(#[from] ControlError),
    #[error("scene has no {0}")]
    UnknownBody(BodyId),
}

/// PD gains for the controlled body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Coordinates that receive torque. The rest get zero.
    pub actuated: Vec<usize>,
    pub kp: f64,
    pub kd: f64,
    /// Coordinates driven with the ankle gains instead.
    #[serde(default)]
    pub ankles: Vec<usize>,
    #[serde(default)]
    pub ankle_kp: f64,
    #[serde(default)]
    pub ankle_kd: f64,
}

/// A joint-space motion planned at setup and tracked by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    /// Coordinates of the controlled body the plan moves.
    pub dofs: Vec<usize>,
    pub goal: Vec<f64>,
    /// Start configuration; zeros when absent.
    #[serde(default)]
    pub start: Option<Vec<f64>>,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    /// Simulated time at which tracking begins.
    #[serde(default)]
    pub start_time: f64,
    /// Collision pairs disabled while planning.
    #[serde(default)]
    pub ignore_pairs: Vec<(BodyId, BodyId)>,
    #[serde(default = "default_max_step")]
    pub max_step: f64,
}

fn default_max_step() -> f64 {
    StraightLinePlanner::default().max_step
}

/// Everything needed to set up a session, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    #[serde(default)]
    pub world: WorldParams,
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub controlled_body: BodyId,
    /// `(coordinate, value)` pairs written into the controlled body before anything else.
    #[serde(default)]
    pub initial_offsets: Vec<(usize, f64)>,
    pub control: ControlSpec,
    #[serde(default)]
    pub plan: Option<PlanSpec>,
}

/// A built scene, ready to hand to a session.
#[derive(Debug)]
pub struct Scene {
    pub world: ArticulatedWorld,
    pub controller: PdController,
    pub controlled_body: BodyId,
    /// Duration of the tracked trajectory, if planning succeeded.
    pub trajectory_duration: Option<f64>,
}

impl SceneSpec {
    /// Humanoid on a ground plate: 33 robot coordinates behind a 6-DOF
    /// floating root, bent knees, and a right-arm raise planned at startup.
    ///
    /// Gains are positive under the `kp·(ref − q) − kd·q̇` law and retuned for
    /// [`ArticulatedWorld`]'s unit-inertia joints at a 1 ms timestep, so the
    /// ankles use 1000/200 rather than the stiffer gains a full rigid-body
    /// engine would take.
    pub fn demo() -> Self {
        let robot = BodyId(0);
        let ground = BodyId(1);
        let deg = |d: f64| d.to_radians();
        Self {
            world: WorldParams::default(),
            bodies: vec![
                BodySpec::new("robot", 33).with_ground_contact(ground, 2),
                BodySpec::new("ground", 6).immobile(),
            ],
            controlled_body: robot,
            initial_offsets: vec![
                (19, deg(-10.0)),
                (20, deg(-10.0)),
                (23, deg(20.0)),
                (24, deg(20.0)),
                (27, deg(-10.0)),
                (28, deg(-10.0)),
            ],
            control: ControlSpec {
                actuated: (6..33).collect(),
                kp: 500.0,
                kd: 100.0,
                ankles: vec![27, 28],
                ankle_kp: 1000.0,
                ankle_kd: 200.0,
            },
            plan: Some(PlanSpec {
                dofs: (8..15).collect(),
                goal: vec![0.0, -FRAC_PI_2, 0.0, -FRAC_PI_2, 0.0, 0.0, 0.0],
                start: None,
                max_velocity: 0.3,
                max_acceleration: 0.3,
                start_time: 0.1,
                ignore_pairs: vec![(robot, ground)],
                max_step: default_max_step(),
            }),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Planner configured from the plan's step size.
    pub fn planner(&self) -> StraightLinePlanner {
        StraightLinePlanner {
            max_step: self
                .plan
                .as_ref()
                .map_or_else(default_max_step, |plan| plan.max_step),
            limits: None,
        }
    }

    /// Build the world and controller, then plan the startup motion.
    ///
    /// A planner failure is logged and the scene comes up without a
    /// trajectory. Collision pairs disabled for planning are re-enabled
    /// whatever happens.
    pub fn build<P: Planner + ?Sized>(&self, planner: &P) -> Result<Scene, SceneError> {
        let mut world = ArticulatedWorld::new(self.world, self.bodies.clone())?;
        let body = self.controlled_body;
        let mut pose = world
            .pose(body)
            .map_err(|_| SceneError::UnknownBody(body))?
            .to_vec();

        for &(dof, value) in &self.initial_offsets {
            let count = pose.len();
            let slot = pose
                .get_mut(dof)
                .ok_or(ControlError::InvalidDof { dof, count })?;
            *slot = value;
        }
        let placed = PoseUpdate {
            integrate_velocity: false,
            recompute_derived: true,
        };
        world.set_pose(body, &pose, placed)?;

        let count = pose.len();
        let mut controller = PdController::new(
            pose,
            self.control.actuated.clone(),
            vec![self.control.kp; count],
            vec![self.control.kd; count],
        )?;
        if !self.control.ankles.is_empty() {
            let n = self.control.ankles.len();
            controller = controller.with_ankles(
                self.control.ankles.clone(),
                vec![self.control.ankle_kp; n],
                vec![self.control.ankle_kd; n],
            )?;
        }

        let trajectory_duration = match &self.plan {
            Some(plan) => {
                let pairs: Vec<CollisionPair> = plan
                    .ignore_pairs
                    .iter()
                    .map(|&(a, b)| CollisionPair::new(a, b))
                    .collect();
                for &pair in &pairs {
                    world.set_pair_active(pair, false);
                }
                let planned = plan_motion(&world, planner, body, plan, &mut controller);
                for &pair in &pairs {
                    world.set_pair_active(pair, true);
                }
                planned?
            }
            None => None,
        };

        tracing::info!(
            bodies = self.bodies.len(),
            dofs = world.layout().total(),
            trajectory = trajectory_duration.is_some(),
            "scene built"
        );
        Ok(Scene {
            world,
            controller,
            controlled_body: body,
            trajectory_duration,
        })
    }
}

fn plan_motion<P: Planner + ?Sized>(
    world: &ArticulatedWorld,
    planner: &P,
    body: BodyId,
    plan: &PlanSpec,
    controller: &mut PdController,
) -> Result<Option<f64>, SceneError> {
    let start = plan
        .start
        .clone()
        .unwrap_or_else(|| vec![0.0; plan.dofs.len()]);
    let path = match planner.plan(world, body, &plan.dofs, &start, &plan.goal) {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(error = %err, "planning failed; continuing without a trajectory");
            return Ok(None);
        }
    };

    let n = plan.dofs.len();
    let trajectory = Trajectory::new(
        path,
        &vec![plan.max_velocity; n],
        &vec![plan.max_acceleration; n],
    )?;
    let duration = trajectory.duration();
    tracing::info!(duration, "trajectory generated");
    controller.set_trajectory(trajectory, plan.start_time, plan.dofs.clone())?;
    Ok(Some(duration))
}
