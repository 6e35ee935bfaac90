use crate::geometry::{Field, Vec2};
use crate::gesture::Gesture;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub type ObstacleId = u64;

/// Gesture/visual pairing an obstacle is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleKind {
    pub gesture: Gesture,
    pub emoji: &'static str,
}

pub const CATALOG: [ObstacleKind; 5] = [
    ObstacleKind {
        gesture: Gesture::OpenHand,
        emoji: "🖐",
    },
    ObstacleKind {
        gesture: Gesture::Peace,
        emoji: "✌",
    },
    ObstacleKind {
        gesture: Gesture::Metal,
        emoji: "🤘",
    },
    ObstacleKind {
        gesture: Gesture::Fist,
        emoji: "✊",
    },
    ObstacleKind {
        gesture: Gesture::Pointing,
        emoji: "👆",
    },
];

/// An emoji square sliding toward the player
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// Top-left corner in field pixels
    pub position: Vec2,
    pub required_gesture: Gesture,
    pub emoji: &'static str,
    passed: bool,
}

impl Obstacle {
    pub fn new(id: ObstacleId, position: Vec2, kind: ObstacleKind) -> Self {
        Self {
            id,
            position,
            required_gesture: kind.gesture,
            emoji: kind.emoji,
            passed: false,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// One-way: a passed obstacle is never evaluated for failure again.
    pub fn mark_passed(&mut self) {
        self.passed = true;
    }

    pub fn center(&self, size: f64) -> Vec2 {
        Vec2::new(self.position.x + size / 2.0, self.position.y + size / 2.0)
    }

    pub fn displace(&mut self, delta: Vec2) {
        self.position.x += delta.x;
        self.position.y += delta.y;
    }
}

/// Spawns obstacles at the trailing (bottom-right) edge of the field
#[derive(Debug)]
pub struct ObstacleFactory<R: Rng = StdRng> {
    rng: R,
    size: f64,
    jitter_min: u32,
    jitter_max: u32,
}

impl ObstacleFactory<StdRng> {
    pub fn from_entropy(size: f64, jitter_min: u32, jitter_max: u32) -> Self {
        Self::with_rng(StdRng::from_entropy(), size, jitter_min, jitter_max)
    }

    pub fn seeded(seed: u64, size: f64, jitter_min: u32, jitter_max: u32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), size, jitter_min, jitter_max)
    }
}

impl<R: Rng> ObstacleFactory<R> {
    /// An inverted jitter range is read with its bounds swapped.
    pub fn with_rng(rng: R, size: f64, jitter_min: u32, jitter_max: u32) -> Self {
        Self {
            rng,
            size,
            jitter_min: jitter_min.min(jitter_max),
            jitter_max: jitter_min.max(jitter_max),
        }
    }

    pub fn create(&mut self, field: Field, id: ObstacleId) -> Obstacle {
        let kind = *CATALOG.choose(&mut self.rng).unwrap_or(&CATALOG[0]);
        let jitter = self.rng.gen_range(self.jitter_min..=self.jitter_max) as f64;
        let position = Vec2::new(
            field.width - self.size,
            field.height - self.size - jitter,
        );
        tracing::debug!(id, gesture = %kind.gesture, x = position.x, y = position.y, "spawned obstacle");
        Obstacle::new(id, position, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn inverted_jitter_range_is_swapped() {
        let mut factory = ObstacleFactory::seeded(3, 100.0, 150, 50);
        let field = Field::new(1280, 720);
        for id in 0..50 {
            let y = factory.create(field, id).position.y;
            assert!((470.0..=570.0).contains(&y), "y = {y}");
        }

        let mut fixed = ObstacleFactory::seeded(3, 100.0, 80, 80);
        assert_eq!(fixed.create(field, 0).position.y, 540.0);
    }

    #[test]
    fn spawns_at_trailing_edge_with_jitter() {
        let mut factory = ObstacleFactory::seeded(7, 100.0, 50, 150);
        let field = Field::new(1280, 720);
        for id in 0..50 {
            let o = factory.create(field, id);
            assert_eq!(o.id, id);
            assert_eq!(o.position.x, 1180.0);
            assert!(o.position.y >= 720.0 - 100.0 - 150.0);
            assert!(o.position.y <= 720.0 - 100.0 - 50.0);
            assert!(!o.passed());
        }
    }

    #[test]
    fn catalog_pairs_are_consistent() {
        for kind in CATALOG {
            assert_eq!(kind.emoji, kind.gesture.emoji());
        }
        let gestures: HashSet<_> = CATALOG.iter().map(|k| k.gesture).collect();
        assert_eq!(gestures.len(), 5);
    }

    #[test]
    fn every_kind_eventually_appears() {
        let mut factory = ObstacleFactory::seeded(42, 100.0, 50, 150);
        let field = Field::new(1280, 720);
        let seen: HashSet<_> = (0..200)
            .map(|id| factory.create(field, id).required_gesture)
            .collect();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn same_seed_same_sequence() {
        let field = Field::new(640, 480);
        let mut a = ObstacleFactory::seeded(3, 80.0, 10, 20);
        let mut b = ObstacleFactory::seeded(3, 80.0, 10, 20);
        for id in 0..10 {
            assert_eq!(a.create(field, id), b.create(field, id));
        }
    }

    #[test]
    fn passed_is_one_way() {
        let mut o = Obstacle::new(0, Vec2::new(0.0, 0.0), CATALOG[3]);
        o.mark_passed();
        o.mark_passed();
        assert!(o.passed());
        assert_eq!(o.center(100.0), Vec2::new(50.0, 50.0));
    }
}
