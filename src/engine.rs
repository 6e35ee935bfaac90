//! Per-frame gameplay: motion, zone evaluation, failure accounting, the correction
//! cycle, difficulty scaling, spawning and termination.
//!
//! Game speed is tied to the caller's frame rate: every `step` moves obstacles by one
//! frame's displacement, so a 30 fps camera plays at half the speed of a 60 fps one.

use crate::config::{ConfigError, GameConfig};
use crate::events::{FailReason, GameEvent};
use crate::geometry::{DetectionZone, Field, Vec2};
use crate::gesture::{classify, Gesture, HandLandmarks, Landmark};
use crate::obstacle::{ObstacleFactory, ObstacleId};
use crate::retry::RetryController;
use crate::session::{GameSession, RetryState};
use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

/// What the tracking collaborator saw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub hand_detected: bool,
    /// Ignored unless `hand_detected`
    pub hand_x: i32,
    pub hand_y: i32,
    /// `None` is the unknown pose
    pub gesture: Option<Gesture>,
}

impl FrameInput {
    pub fn no_hand() -> Self {
        Self {
            hand_detected: false,
            hand_x: -1,
            hand_y: -1,
            gesture: None,
        }
    }

    pub fn hand(hand_x: i32, hand_y: i32, gesture: Option<Gesture>) -> Self {
        Self {
            hand_detected: true,
            hand_x,
            hand_y,
            gesture,
        }
    }

    /// Hand position is the wrist scaled to field pixels.
    pub fn from_hand(hand: Option<&HandLandmarks>, field: Field) -> Self {
        match hand {
            None => Self::no_hand(),
            Some(h) => {
                let wrist = h.get(Landmark::Wrist);
                Self::hand(
                    (wrist.x * field.width) as i32,
                    (wrist.y * field.height) as i32,
                    classify(h),
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    GameOver(FailReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub status: Status,
    pub events: Vec<GameEvent>,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, Status::GameOver(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("session already ended ({0}); reset before stepping again")]
    SessionOver(FailReason),
}

pub struct GameplayEngine<R: Rng = StdRng> {
    config: GameConfig,
    field: Field,
    zone: DetectionZone,
    retry: RetryController,
    factory: ObstacleFactory<R>,
}

impl GameplayEngine<StdRng> {
    pub fn new(config: GameConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
        let factory = ObstacleFactory::from_entropy(
            config.obstacle_size,
            config.spawn_jitter_min,
            config.spawn_jitter_max,
        );
        Self::with_factory(config, width, height, factory)
    }

    pub fn seeded(config: GameConfig, width: u32, height: u32, seed: u64) -> Result<Self, ConfigError> {
        let factory = ObstacleFactory::seeded(
            seed,
            config.obstacle_size,
            config.spawn_jitter_min,
            config.spawn_jitter_max,
        );
        Self::with_factory(config, width, height, factory)
    }
}

impl<R: Rng> GameplayEngine<R> {
    pub fn with_factory(
        config: GameConfig,
        width: u32,
        height: u32,
        factory: ObstacleFactory<R>,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::Field { width, height });
        }
        config.validate()?;
        let field = Field::new(width, height);
        Ok(Self {
            zone: config.zone(field),
            retry: RetryController::new(&config),
            config,
            field,
            factory,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn zone(&self) -> &DetectionZone {
        &self.zone
    }

    pub fn new_session(&mut self) -> GameSession {
        GameSession::reset(self.field, &self.config, &mut self.factory)
    }

    /// Advances the session by one frame.
    pub fn step(
        &mut self,
        session: &mut GameSession,
        input: &FrameInput,
    ) -> Result<StepOutcome, EngineError> {
        if let Some(reason) = session.game_over() {
            return Err(EngineError::SessionOver(reason));
        }
        session.frames += 1;

        let size = self.config.obstacle_size;
        let mut events = Vec::new();

        for idx in 0..session.obstacles.len() {
            let id = session.obstacles[idx].id;

            if session.is_stalled(id) {
                let before = session.retry_state();
                let after = self.retry.advance(&mut session.obstacles[idx], before, &self.zone);
                if after != before {
                    tracing::debug!(id, from = %before, to = %after, "retry transition");
                }
                session.set_retry_state(after);
            } else {
                let speed = session.speed;
                session.obstacles[idx].displace(Vec2::new(-speed.x, -speed.y));
            }

            let in_zone = self.zone.contains(session.obstacles[idx].center(size));

            if in_zone && !session.obstacles[idx].passed() {
                match self.judge(input, session.obstacles[idx].required_gesture) {
                    Ok(()) => self.score(session, idx, &mut events),
                    // edge-triggered: a stalled session does not re-raise
                    Err(reason) if !session.in_retry_mode() => {
                        self.raise_failure(session, id, reason, &mut events);
                        if let Some(outcome) = self.end_if_exhausted(session, reason, &mut events) {
                            return Ok(outcome);
                        }
                    }
                    Err(_) => {}
                }
            }

            if session.is_stalled(id)
                && session.retry_state() == RetryState::WaitingForCorrection
                && self.retry.overran(&session.obstacles[idx], &self.zone, self.field)
            {
                session.fails += 1;
                session.retry_fails += 1;
                tracing::warn!(id, fails = session.fails, retry_fails = session.retry_fails, "correction failed");
                if let Some(outcome) =
                    self.end_if_exhausted(session, FailReason::FailedCorrection, &mut events)
                {
                    return Ok(outcome);
                }
                session.set_retry_state(RetryState::Retreating);
                events.push(GameEvent::Warning(FailReason::FailedCorrection));
            }

            let obstacle = &session.obstacles[idx];
            if !obstacle.passed()
                && !session.in_retry_mode()
                && self.field.is_past_leading_edge(obstacle.position, size)
            {
                session.fails += 1;
                tracing::warn!(id, fails = session.fails, "obstacle missed");
                if let Some(outcome) =
                    self.end_if_exhausted(session, FailReason::MissedObstacle, &mut events)
                {
                    return Ok(outcome);
                }
                events.push(GameEvent::Warning(FailReason::MissedObstacle));
            }
        }

        let field = self.field;
        let stalled = session.stalled_obstacle_id();
        session
            .obstacles
            .retain(|o| Some(o.id) == stalled || !field.is_off_field(o.position, size));

        if self.ready_to_spawn(session) {
            session.spawn(self.field, &mut self.factory);
        }

        Ok(StepOutcome {
            status: Status::Running,
            events,
        })
    }

    fn judge(&self, input: &FrameInput, required: Gesture) -> Result<(), FailReason> {
        if !input.hand_detected {
            Err(FailReason::NoHandDetected)
        } else if !self.zone.contains_hand(input.hand_x, input.hand_y) {
            Err(FailReason::HandNotInZone)
        } else if input.gesture != Some(required) {
            Err(FailReason::WrongGesture)
        } else {
            Ok(())
        }
    }

    fn score(&self, session: &mut GameSession, idx: usize, events: &mut Vec<GameEvent>) {
        let id = session.obstacles[idx].id;
        if session.is_stalled(id) {
            session.clear_stall();
            session.retry_fails = 0;
            session.last_failed_obstacle_id = None;
            tracing::debug!(id, "correction resolved");
        }
        session.obstacles[idx].mark_passed();
        session.score += 1;
        if session.score % self.config.score_interval == 0 {
            session.speed.x += self.config.speed_increment.x;
            session.speed.y += self.config.speed_increment.y;
            tracing::debug!(speed_x = session.speed.x, speed_y = session.speed.y, "speed up");
        }
        tracing::info!(id, score = session.score, "obstacle matched");
        events.push(GameEvent::Scored {
            obstacle_id: id,
            score: session.score,
        });
    }

    fn raise_failure(
        &self,
        session: &mut GameSession,
        id: ObstacleId,
        reason: FailReason,
        events: &mut Vec<GameEvent>,
    ) {
        session.stall(id);
        session.fails += 1;
        if session.last_failed_obstacle_id == Some(id) {
            session.retry_fails += 1;
        } else {
            session.retry_fails = 1;
            session.last_failed_obstacle_id = Some(id);
        }
        tracing::warn!(id, %reason, fails = session.fails, retry_fails = session.retry_fails, "failure raised");
        events.push(GameEvent::Warning(reason));
    }

    fn end_if_exhausted(
        &self,
        session: &mut GameSession,
        reason: FailReason,
        events: &mut Vec<GameEvent>,
    ) -> Option<StepOutcome> {
        let max = self.config.max_fails;
        if session.fails < max && session.retry_fails < max {
            return None;
        }
        session.end(reason);
        tracing::info!(%reason, score = session.score, fails = session.fails, "game over");
        events.push(GameEvent::GameOver(reason));
        Some(StepOutcome {
            status: Status::GameOver(reason),
            events: std::mem::take(events),
        })
    }

    fn ready_to_spawn(&self, session: &GameSession) -> bool {
        if session.in_retry_mode() || !session.obstacles.iter().all(|o| o.passed()) {
            return false;
        }
        match session.obstacles.last() {
            None => true,
            Some(newest) => {
                newest.position.x
                    <= self.field.width - self.config.obstacle_size - self.config.min_spawn_distance
            }
        }
    }
}
