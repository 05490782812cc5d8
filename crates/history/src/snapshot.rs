use crate::store::HistoryError;
use rigplay_kernel::{PoseUpdate, World, WorldError};

/// Generalized coordinates of every body at one instant.
///
/// Laid out by the world's [`DofLayout`](rigplay_common::DofLayout): body
/// `i` occupies `offsets[i]..offsets[i] + counts[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    coords: Vec<f64>,
}

impl Snapshot {
    /// Copy the current pose of every body out of the world.
    pub fn capture<W: World + ?Sized>(world: &W) -> Result<Self, HistoryError> {
        let layout = world.layout();
        let mut coords = Vec::new();
        coords.try_reserve_exact(layout.total())?;
        for body in layout.bodies() {
            coords.extend_from_slice(world.pose(body)?);
        }
        Ok(Self { coords })
    }

    /// Write each body's segment back into the world.
    ///
    /// Pure overwrite: velocities, forces and contacts are left alone.
    pub fn restore<W: World + ?Sized>(&self, world: &mut W) -> Result<(), HistoryError> {
        let layout = world.layout().clone();
        layout
            .check_len(self.coords.len())
            .map_err(WorldError::from)?;
        for body in layout.bodies() {
            let segment = layout
                .segment(&self.coords, body)
                .map_err(WorldError::from)?;
            world.set_pose(body, segment, PoseUpdate::OVERWRITE)?;
        }
        Ok(())
    }

    pub fn from_coords(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigplay_common::BodyId;
    use rigplay_kernel::{ArticulatedWorld, BodySpec, WorldParams};

    fn two_bodies() -> ArticulatedWorld {
        let bodies = vec![
            BodySpec::new("base", 2).with_initial(vec![1.0, 2.0]),
            BodySpec::new("arm", 3).with_initial(vec![3.0, 4.0, 5.0]),
        ];
        ArticulatedWorld::new(WorldParams::default(), bodies).unwrap()
    }

    #[test]
    fn capture_concatenates_bodies() {
        let world = two_bodies();
        let snap = Snapshot::capture(&world).unwrap();
        assert_eq!(snap.coords(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(snap.len(), 5);
    }

    #[test]
    fn restore_roundtrip_is_bit_exact() {
        let mut world = two_bodies();
        world
            .set_internal_forces(BodyId(1), &[0.3, -0.7, 1.1])
            .unwrap();
        for _ in 0..37 {
            world.step_once();
        }
        let baked = Snapshot::capture(&world).unwrap();
        let expected: Vec<u64> = baked.coords().iter().map(|c| c.to_bits()).collect();

        for _ in 0..50 {
            world.step_once();
        }
        assert_ne!(world.positions(), baked.coords());

        baked.restore(&mut world).unwrap();
        let restored: Vec<u64> = world.positions().iter().map(|c| c.to_bits()).collect();
        assert_eq!(restored, expected);
    }

    #[test]
    fn restore_leaves_velocity_alone() {
        let mut world = two_bodies();
        let baked = Snapshot::capture(&world).unwrap();
        world.set_internal_forces(BodyId(0), &[1.0, 1.0]).unwrap();
        world.step_once();
        let velocity = world.velocity(BodyId(0)).unwrap().to_vec();

        baked.restore(&mut world).unwrap();
        assert_eq!(world.velocity(BodyId(0)).unwrap(), velocity.as_slice());
    }

    #[test]
    fn restore_rejects_wrong_width() {
        let mut world = two_bodies();
        let snap = Snapshot::from_coords(vec![0.0; 4]);
        assert!(matches!(snap.restore(&mut world), Err(HistoryError::World(_))));
        assert_eq!(world.positions(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
