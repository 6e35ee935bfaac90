use crate::obstacle::ObstacleId;

/// Why a failure was counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum FailReason {
    WrongGesture,
    HandNotInZone,
    NoHandDetected,
    MissedObstacle,
    FailedCorrection,
}

impl FailReason {
    /// Text shown on the game-over screen
    pub fn message(&self) -> &'static str {
        match self {
            FailReason::WrongGesture => "Wrong gesture!",
            FailReason::HandNotInZone => "Hand not in the detection zone!",
            FailReason::NoHandDetected => "No hand detected!",
            FailReason::MissedObstacle => "Obstacle missed!",
            FailReason::FailedCorrection => "Correction failed!",
        }
    }
}

/// Domain events for rendering and audio collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Scored { obstacle_id: ObstacleId, score: u32 },
    Warning(FailReason),
    GameOver(FailReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SoundCue {
    Score,
    Warning,
    GameOver,
}

impl GameEvent {
    pub fn sound_cue(&self) -> SoundCue {
        match self {
            GameEvent::Scored { .. } => SoundCue::Score,
            GameEvent::Warning(_) => SoundCue::Warning,
            GameEvent::GameOver(_) => SoundCue::GameOver,
        }
    }
}

/// Realizes events (sound, flashes, HUD). Implementations must not fail the frame.
pub trait EventSink {
    fn on_event(&mut self, event: &GameEvent);

    /// A session is starting; the menu jingle plays here.
    fn on_session_start(&mut self) {}
}

/// Sink that only logs
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Scored { obstacle_id, score } => {
                tracing::info!(obstacle_id, score, "scored")
            }
            GameEvent::Warning(reason) => tracing::warn!(%reason, "failure"),
            GameEvent::GameOver(reason) => tracing::info!(%reason, "game over"),
        }
    }

    fn on_session_start(&mut self) {
        tracing::info!("session started");
    }
}

/// Sink that records everything it sees, for tests and replays
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<GameEvent>,
    pub cues: Vec<SoundCue>,
    pub sessions_started: usize,
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, event: &GameEvent) {
        self.cues.push(event.sound_cue());
        self.events.push(event.clone());
    }

    fn on_session_start(&mut self) {
        self.sessions_started += 1;
    }
}
