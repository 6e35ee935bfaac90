use crate::config::GameConfig;
use crate::events::FailReason;
use crate::geometry::{Field, Vec2};
use crate::obstacle::{Obstacle, ObstacleFactory, ObstacleId};
use rand::Rng;

/// Phase of the correction cycle for the stalled obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum RetryState {
    #[default]
    None,
    Retreating,
    AdvancingForRetry,
    WaitingForCorrection,
}

/// Mutable state of one play-through. Replaced wholesale on restart.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub score: u32,
    pub fails: u32,
    pub retry_fails: u32,
    pub last_failed_obstacle_id: Option<ObstacleId>,
    /// Spawn order
    pub obstacles: Vec<Obstacle>,
    pub obstacle_counter: ObstacleId,
    pub speed: Vec2,
    stalled: Option<ObstacleId>,
    retry_state: RetryState,
    game_over: Option<FailReason>,
    pub frames: u64,
}

impl GameSession {
    /// Fresh session: zero counters, base speed, no retry, exactly one obstacle.
    pub fn reset<R: Rng>(field: Field, config: &GameConfig, factory: &mut ObstacleFactory<R>) -> Self {
        let mut session = Self {
            score: 0,
            fails: 0,
            retry_fails: 0,
            last_failed_obstacle_id: None,
            obstacles: Vec::new(),
            obstacle_counter: 0,
            speed: config.initial_speed,
            stalled: None,
            retry_state: RetryState::None,
            game_over: None,
            frames: 0,
        };
        session.spawn(field, factory);
        session
    }

    pub(crate) fn spawn<R: Rng>(&mut self, field: Field, factory: &mut ObstacleFactory<R>) {
        let id = self.obstacle_counter;
        self.obstacle_counter += 1;
        self.obstacles.push(factory.create(field, id));
    }

    pub fn stalled_obstacle_id(&self) -> Option<ObstacleId> {
        self.stalled
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry_state
    }

    pub fn in_retry_mode(&self) -> bool {
        self.stalled.is_some()
    }

    pub fn is_stalled(&self, id: ObstacleId) -> bool {
        self.stalled == Some(id)
    }

    pub fn game_over(&self) -> Option<FailReason> {
        self.game_over
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    // stalled id and retry state only ever change together through these three

    pub(crate) fn stall(&mut self, id: ObstacleId) {
        self.stalled = Some(id);
        self.retry_state = RetryState::Retreating;
    }

    pub(crate) fn set_retry_state(&mut self, state: RetryState) {
        if self.stalled.is_some() && state != RetryState::None {
            self.retry_state = state;
        }
    }

    pub(crate) fn clear_stall(&mut self) {
        self.stalled = None;
        self.retry_state = RetryState::None;
    }

    pub(crate) fn end(&mut self, reason: FailReason) {
        self.game_over = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> GameSession {
        let config = GameConfig::default();
        let mut factory = ObstacleFactory::seeded(1, config.obstacle_size, 50, 150);
        GameSession::reset(Field::new(1280, 720), &config, &mut factory)
    }

    #[test]
    fn reset_produces_initial_session() {
        let s = fresh();
        assert_eq!(s.score, 0);
        assert_eq!(s.fails, 0);
        assert_eq!(s.retry_fails, 0);
        assert_eq!(s.last_failed_obstacle_id, None);
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.obstacles[0].id, 0);
        assert_eq!(s.obstacle_counter, 1);
        assert_eq!(s.speed, Vec2::new(7.0, 4.0));
        assert_eq!(s.stalled_obstacle_id(), None);
        assert_eq!(s.retry_state(), RetryState::None);
        assert_eq!(s.game_over(), None);
    }

    #[test]
    fn stall_and_clear_toggle_together() {
        let mut s = fresh();
        s.stall(0);
        assert_eq!(s.stalled_obstacle_id(), Some(0));
        assert_eq!(s.retry_state(), RetryState::Retreating);
        assert!(s.is_stalled(0));

        s.set_retry_state(RetryState::WaitingForCorrection);
        assert_eq!(s.retry_state(), RetryState::WaitingForCorrection);

        s.clear_stall();
        assert!(!s.in_retry_mode());
        assert_eq!(s.retry_state(), RetryState::None);

        // no stalled obstacle: retry state stays None
        s.set_retry_state(RetryState::Retreating);
        assert_eq!(s.retry_state(), RetryState::None);
    }

    #[test]
    fn spawn_ids_are_never_reused() {
        let config = GameConfig::default();
        let mut factory = ObstacleFactory::seeded(9, config.obstacle_size, 50, 150);
        let field = Field::new(1280, 720);
        let mut s = GameSession::reset(field, &config, &mut factory);
        s.obstacles.clear();
        s.spawn(field, &mut factory);
        s.spawn(field, &mut factory);
        let ids: Vec<_> = s.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
