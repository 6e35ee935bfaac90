//! Correction cycle for the single stalled obstacle.
//!
//! `Retreating` pushes the obstacle back until it clears the far edge of the zone,
//! `AdvancingForRetry` brings it back until its centre is inside again, and
//! `WaitingForCorrection` lets it drift through the zone on its retry course until
//! the player matches it or it overruns.

use crate::config::GameConfig;
use crate::geometry::{DetectionZone, Field, Vec2};
use crate::obstacle::Obstacle;
use crate::session::RetryState;

#[derive(Debug, Clone, Copy)]
pub struct RetryController {
    retreat_speed: Vec2,
    advance_speed: Vec2,
    size: f64,
}

impl RetryController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            retreat_speed: config.retreat_speed,
            advance_speed: config.advance_speed,
            size: config.obstacle_size,
        }
    }

    /// Moves the stalled obstacle one frame and returns the state it is in afterwards.
    pub fn advance(
        &self,
        obstacle: &mut Obstacle,
        state: RetryState,
        zone: &DetectionZone,
    ) -> RetryState {
        match state {
            RetryState::None => RetryState::None,
            RetryState::Retreating => {
                obstacle.displace(self.retreat_speed);
                if obstacle.position.x > zone.rect.x_end + self.size / 2.0 {
                    RetryState::AdvancingForRetry
                } else {
                    RetryState::Retreating
                }
            }
            RetryState::AdvancingForRetry => {
                obstacle.displace(self.toward_player());
                let center = obstacle.center(self.size);
                // a steep course can cross a corner without the centre ever landing inside
                let slipped_past = center.x < zone.rect.x_start || center.y < zone.rect.y_start;
                if zone.contains(center) || slipped_past {
                    RetryState::WaitingForCorrection
                } else {
                    RetryState::AdvancingForRetry
                }
            }
            RetryState::WaitingForCorrection => {
                obstacle.displace(self.toward_player());
                RetryState::WaitingForCorrection
            }
        }
    }

    /// The stalled obstacle slipped through the zone's leading edge or left the field
    /// behind it without being matched.
    pub fn overran(&self, obstacle: &Obstacle, zone: &DetectionZone, field: Field) -> bool {
        let center = obstacle.center(self.size);
        center.x < zone.rect.x_start
            || center.y < zone.rect.y_start
            || field.is_past_trailing_edge(obstacle.position)
    }

    fn toward_player(&self) -> Vec2 {
        Vec2::new(-self.advance_speed.x, -self.advance_speed.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::CATALOG;

    fn setup() -> (RetryController, DetectionZone, Field) {
        let config = GameConfig::default();
        let field = Field::new(1280, 720);
        (RetryController::new(&config), config.zone(field), field)
    }

    #[test]
    fn retreat_until_clear_of_far_edge() {
        let (rc, zone, _) = setup();
        let mut o = Obstacle::new(0, Vec2::new(590.0, 310.0), CATALOG[0]);
        let mut state = RetryState::Retreating;
        let mut frames = 0;
        while state == RetryState::Retreating {
            state = rc.advance(&mut o, state, &zone);
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(state, RetryState::AdvancingForRetry);
        assert!(o.position.x > zone.rect.x_end + 50.0);
        assert!(o.position.x - 5.0 <= zone.rect.x_end + 50.0);
    }

    #[test]
    fn advance_until_centre_back_in_zone() {
        let (rc, zone, _) = setup();
        let mut o = Obstacle::new(0, Vec2::new(950.0, 400.0), CATALOG[0]);
        let mut state = RetryState::AdvancingForRetry;
        while state == RetryState::AdvancingForRetry {
            state = rc.advance(&mut o, state, &zone);
        }
        assert_eq!(state, RetryState::WaitingForCorrection);
        assert!(zone.contains(o.center(100.0)));
    }

    #[test]
    fn waiting_drifts_toward_player_until_overrun() {
        let (rc, zone, field) = setup();
        let mut o = Obstacle::new(0, Vec2::new(790.0, 400.0), CATALOG[0]);
        let mut frames = 0;
        while !rc.overran(&o, &zone, field) {
            let s = rc.advance(&mut o, RetryState::WaitingForCorrection, &zone);
            assert_eq!(s, RetryState::WaitingForCorrection);
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(o.center(100.0).x < zone.rect.x_start || o.center(100.0).y < zone.rect.y_start);
    }

    #[test]
    fn advancing_past_the_zone_hands_over_to_waiting() {
        let (rc, zone, field) = setup();
        // centre above the zone and still climbing
        let mut o = Obstacle::new(0, Vec2::new(600.0, 40.0), CATALOG[0]);
        let state = rc.advance(&mut o, RetryState::AdvancingForRetry, &zone);
        assert_eq!(state, RetryState::WaitingForCorrection);
        assert!(rc.overran(&o, &zone, field));
    }

    #[test]
    fn none_state_does_not_move() {
        let (rc, zone, _) = setup();
        let mut o = Obstacle::new(0, Vec2::new(10.0, 10.0), CATALOG[0]);
        assert_eq!(rc.advance(&mut o, RetryState::None, &zone), RetryState::None);
        assert_eq!(o.position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn trailing_edge_counts_as_overrun() {
        let (rc, zone, field) = setup();
        let o = Obstacle::new(0, Vec2::new(1300.0, 300.0), CATALOG[0]);
        assert!(rc.overran(&o, &zone, field));
    }
}
