use rigplay_common::CollisionPair;
use std::collections::BTreeSet;

/// Which body pairs are excluded from collision checking.
///
/// Every pair is active unless explicitly disabled.
#[derive(Debug, Clone, Default)]
pub struct CollisionFilter {
    disabled: BTreeSet<CollisionPair>,
}

impl CollisionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable a pair. Returns true if the state changed.
    pub fn set_active(&mut self, pair: CollisionPair, active: bool) -> bool {
        let changed = if active {
            self.disabled.remove(&pair)
        } else {
            self.disabled.insert(pair)
        };
        if changed {
            let (a, b) = pair.bodies();
            tracing::debug!(%a, %b, active, "collision pair toggled");
        }
        changed
    }

    pub fn is_active(&self, pair: CollisionPair) -> bool {
        !self.disabled.contains(&pair)
    }

    /// Pairs currently disabled, in canonical order.
    pub fn disabled(&self) -> impl Iterator<Item = CollisionPair> + '_ {
        self.disabled.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigplay_common::BodyId;

    #[test]
    fn pairs_start_active() {
        let filter = CollisionFilter::new();
        assert!(filter.is_active(CollisionPair::new(BodyId(0), BodyId(1))));
    }

    #[test]
    fn disable_then_enable() {
        let mut filter = CollisionFilter::new();
        let pair = CollisionPair::new(BodyId(0), BodyId(1));
        assert!(filter.set_active(pair, false));
        assert!(!filter.is_active(pair));
        // Order of the bodies does not matter.
        assert!(!filter.is_active(CollisionPair::new(BodyId(1), BodyId(0))));
        assert!(!filter.set_active(pair, false));
        assert!(filter.set_active(pair, true));
        assert!(filter.is_active(pair));
        assert_eq!(filter.disabled().count(), 0);
    }
}
