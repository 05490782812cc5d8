use crate::filter::CollisionFilter;
use crate::world::{PoseUpdate, World, WorldError, check_body_len};
use glam::DVec3;
use rigplay_common::{BodyId, CollisionPair, Contact, DofLayout};
use serde::{Deserialize, Serialize};

/// Declares that one coordinate of a body is its height above another body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundContact {
    /// Body acting as the ground plane at height zero.
    pub ground: BodyId,
    /// Local index of the vertical coordinate inside the body's segment.
    pub height_dof: usize,
}

/// Construction-time description of one articulated body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub dof_count: usize,
    /// Immobile bodies never move under stepping.
    #[serde(default)]
    pub immobile: bool,
    /// Initial coordinates. Empty means all zeros.
    #[serde(default)]
    pub initial: Vec<f64>,
    #[serde(default)]
    pub ground_contact: Option<GroundContact>,
}

impl BodySpec {
    pub fn new(name: impl Into<String>, dof_count: usize) -> Self {
        Self {
            name: name.into(),
            dof_count,
            immobile: false,
            initial: Vec::new(),
            ground_contact: None,
        }
    }

    pub fn immobile(mut self) -> Self {
        self.immobile = true;
        self
    }

    pub fn with_initial(mut self, initial: Vec<f64>) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_ground_contact(mut self, ground: BodyId, height_dof: usize) -> Self {
        self.ground_contact = Some(GroundContact { ground, height_dof });
        self
    }
}

/// Stepping parameters for [`ArticulatedWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Fixed timestep in seconds.
    pub timestep: f64,
    /// Downward acceleration on ground-contact coordinates.
    pub gravity: f64,
    /// Viscous damping applied to every coordinate.
    pub damping: f64,
    /// Penalty stiffness when a body sinks below its ground.
    pub contact_stiffness: f64,
    /// Penalty damping when a body sinks below its ground.
    pub contact_damping: f64,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            timestep: 0.001,
            gravity: 9.81,
            damping: 0.5,
            contact_stiffness: 5_000.0,
            contact_damping: 100.0,
        }
    }
}

/// Reference world: every coordinate is a unit-inertia, damped integrator.
///
/// Uses semi-implicit Euler. Bodies with a [`GroundContact`] feel gravity on
/// their height coordinate and a penalty force while below zero, unless the
/// pair is disabled in the collision filter. This is enough to drive the
/// playback core end to end; it is not meant to be physically accurate.
#[derive(Debug, Clone)]
pub struct ArticulatedWorld {
    params: WorldParams,
    names: Vec<String>,
    immobile: Vec<bool>,
    grounds: Vec<Option<GroundContact>>,
    layout: DofLayout,
    positions: Vec<f64>,
    velocities: Vec<f64>,
    forces: Vec<f64>,
    time: f64,
    steps: u64,
    filter: CollisionFilter,
    contacts: Vec<Contact>,
}

impl ArticulatedWorld {
    /// Build a world. The DOF layout follows the order of `bodies`.
    pub fn new(params: WorldParams, bodies: Vec<BodySpec>) -> Result<Self, WorldError> {
        if !(params.timestep.is_finite() && params.timestep > 0.0) {
            return Err(WorldError::InvalidTimestep(params.timestep));
        }
        let layout = DofLayout::new(bodies.iter().map(|b| b.dof_count));
        let mut positions = vec![0.0; layout.total()];

        for (index, spec) in bodies.iter().enumerate() {
            let body = BodyId(index);
            if !spec.initial.is_empty() {
                check_body_len(&layout, body, spec.initial.len()).map_err(|_| {
                    WorldError::InvalidBody {
                        name: spec.name.clone(),
                        reason: format!(
                            "{} initial coordinates for {} DOFs",
                            spec.initial.len(),
                            spec.dof_count
                        ),
                    }
                })?;
                positions[layout.range(body)?].copy_from_slice(&spec.initial);
            }
            if let Some(contact) = spec.ground_contact {
                if contact.ground.0 >= bodies.len() || contact.ground == body {
                    return Err(WorldError::InvalidBody {
                        name: spec.name.clone(),
                        reason: format!("ground {} is not another body", contact.ground),
                    });
                }
                if contact.height_dof >= spec.dof_count {
                    return Err(WorldError::InvalidBody {
                        name: spec.name.clone(),
                        reason: format!("height coordinate {} out of range", contact.height_dof),
                    });
                }
            }
        }

        tracing::debug!(
            bodies = bodies.len(),
            dofs = layout.total(),
            timestep = params.timestep,
            "articulated world built"
        );

        let total = layout.total();
        Ok(Self {
            params,
            names: bodies.iter().map(|b| b.name.clone()).collect(),
            immobile: bodies.iter().map(|b| b.immobile).collect(),
            grounds: bodies.iter().map(|b| b.ground_contact).collect(),
            layout,
            positions,
            velocities: vec![0.0; total],
            forces: vec![0.0; total],
            time: 0.0,
            steps: 0,
            filter: CollisionFilter::new(),
            contacts: Vec::new(),
        })
    }

    /// Number of steps taken since construction.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn body_name(&self, body: BodyId) -> Option<&str> {
        self.names.get(body.0).map(String::as_str)
    }

    pub fn body_by_name(&self, name: &str) -> Option<BodyId> {
        self.names.iter().position(|n| n == name).map(BodyId)
    }

    /// Flat coordinates of every body, in layout order.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn collision_filter(&self) -> &CollisionFilter {
        &self.filter
    }

    /// Contact for `body` against its ground, if it is below the ground and the pair is active.
    fn ground_contact(&self, body: BodyId) -> Option<(usize, Contact)> {
        let ground = self.grounds[body.0]?;
        if !self.filter.is_active(CollisionPair::new(body, ground.ground)) {
            return None;
        }
        let range = self.layout.range(body).ok()?;
        let height = range.start + ground.height_dof;
        if self.positions[height] >= 0.0 {
            return None;
        }
        // Floating roots put x and y in their first two coordinates.
        let coord = |i: usize| {
            if i < range.len() && i != ground.height_dof {
                self.positions[range.start + i]
            } else {
                0.0
            }
        };
        let contact = Contact {
            body,
            other: ground.ground,
            point: DVec3::new(coord(0), coord(1), 0.0),
            normal: DVec3::Z,
        };
        Some((height, contact))
    }

    fn refresh_contacts(&mut self, body: BodyId) {
        self.contacts.retain(|c| c.body != body);
        if let Some((_, contact)) = self.ground_contact(body) {
            self.contacts.push(contact);
        }
    }
}

impl World for ArticulatedWorld {
    fn layout(&self) -> &DofLayout {
        &self.layout
    }

    fn timestep(&self) -> f64 {
        self.params.timestep
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn step_once(&mut self) {
        let dt = self.params.timestep;
        self.contacts.clear();

        for index in 0..self.layout.body_count() {
            let body = BodyId(index);
            if self.immobile[index] {
                continue;
            }
            let Ok(range) = self.layout.range(body) else {
                continue;
            };

            let mut accel: Vec<f64> = range
                .clone()
                .map(|i| self.forces[i] - self.params.damping * self.velocities[i])
                .collect();

            if let Some(ground) = self.grounds[index] {
                accel[ground.height_dof] -= self.params.gravity;
            }
            if let Some((height, contact)) = self.ground_contact(body) {
                let depth = -self.positions[height];
                accel[height - range.start] += self.params.contact_stiffness * depth
                    - self.params.contact_damping * self.velocities[height];
                self.contacts.push(contact);
            }

            for (i, a) in range.zip(accel) {
                self.velocities[i] += a * dt;
                self.positions[i] += self.velocities[i] * dt;
            }
        }

        self.time += dt;
        self.steps += 1;
        tracing::trace!(time = self.time, contacts = self.contacts.len(), "world stepped");
    }

    fn pose(&self, body: BodyId) -> Result<&[f64], WorldError> {
        Ok(self.layout.segment(&self.positions, body)?)
    }

    fn velocity(&self, body: BodyId) -> Result<&[f64], WorldError> {
        Ok(self.layout.segment(&self.velocities, body)?)
    }

    fn set_pose(
        &mut self,
        body: BodyId,
        pose: &[f64],
        update: PoseUpdate,
    ) -> Result<(), WorldError> {
        check_body_len(&self.layout, body, pose.len())?;
        let range = self.layout.range(body)?;
        if update.integrate_velocity {
            let dt = self.params.timestep;
            for (i, &q) in range.clone().zip(pose) {
                self.velocities[i] = (q - self.positions[i]) / dt;
            }
        }
        self.positions[range].copy_from_slice(pose);
        if update.recompute_derived {
            self.refresh_contacts(body);
        }
        Ok(())
    }

    fn set_internal_forces(&mut self, body: BodyId, forces: &[f64]) -> Result<(), WorldError> {
        check_body_len(&self.layout, body, forces.len())?;
        let range = self.layout.range(body)?;
        self.forces[range].copy_from_slice(forces);
        Ok(())
    }

    fn set_pair_active(&mut self, pair: CollisionPair, active: bool) {
        self.filter.set_active(pair, active);
    }

    fn is_pair_active(&self, pair: CollisionPair) -> bool {
        self.filter.is_active(pair)
    }

    fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}
