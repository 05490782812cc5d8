use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an articulated body within a world.
///
/// Ids are positional: body `n` owns the `n`th segment of the world's
/// [`DofLayout`](crate::DofLayout).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BodyId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// What the viewer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayMode {
    /// Nothing advances.
    #[default]
    Paused,
    /// Physics steps run and each tick bakes one snapshot.
    Simulating,
    /// Baked snapshots are restored into the world in order.
    PlayingBack,
}

impl PlayMode {
    /// Whether the tick driver makes progress in this mode.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Paused)
    }

    /// Short label shown on the HUD. Paused has no label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Paused => "",
            Self::Simulating => "Simulating",
            Self::PlayingBack => "Playing",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Paused => "paused",
            Self::Simulating => "simulating",
            Self::PlayingBack => "playing-back",
        };
        f.write_str(name)
    }
}

/// Unordered pair of bodies that may collide with each other.
///
/// `CollisionPair::new(a, b) == CollisionPair::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionPair {
    first: BodyId,
    second: BodyId,
}

impl CollisionPair {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn bodies(&self) -> (BodyId, BodyId) {
        (self.first, self.second)
    }

    pub fn contains(&self, body: BodyId) -> bool {
        self.first == body || self.second == body
    }
}

/// A contact reported by the world's collision query surface after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Body that is touching.
    pub body: BodyId,
    /// Body it touches (usually the ground).
    pub other: BodyId,
    /// Contact point in world space.
    pub point: DVec3,
    /// Unit contact normal pointing away from `other`.
    pub normal: DVec3,
}
