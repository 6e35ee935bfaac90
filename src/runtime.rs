use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::app::App;
use crate::engine::FrameInput;
use crate::events::EventSink;

/// Unified event type produced by a frame source
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Frame(FrameInput),
    /// Exit requested (quit key, end of script)
    Quit,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read frame: {0}")]
    Read(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame script error: {0}")]
    Csv(#[from] csv::Error),
}

/// Camera + tracker collaborator. Blocking: one call per captured frame paces the loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<SourceEvent, CaptureError>;
}

/// Pointer position in field pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub x: i32,
    pub y: i32,
}

/// Depth-1 pending click shared with the windowing callback. Last click wins.
#[derive(Debug, Clone, Default)]
pub struct ClickSlot {
    pending: Arc<Mutex<Option<Click>>>,
}

impl ClickSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the display layer's callback, possibly on another thread.
    pub fn push(&self, click: Click) {
        if let Ok(mut slot) = self.pending.lock() {
            *slot = Some(click);
        }
    }

    /// Empties the slot. Called exactly once per frame.
    pub fn take(&self) -> Option<Click> {
        self.pending.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Test frame source fed through a channel; a closed channel reads as Quit
pub struct TestFrameSource {
    rx: Receiver<SourceEvent>,
}

impl TestFrameSource {
    pub fn new(rx: Receiver<SourceEvent>) -> Self {
        Self { rx }
    }

    pub fn channel() -> (mpsc::Sender<SourceEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl FrameSource for TestFrameSource {
    fn next_frame(&mut self) -> Result<SourceEvent, CaptureError> {
        match self.rx.try_recv() {
            Ok(ev) => Ok(ev),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(SourceEvent::Quit),
        }
    }
}

/// Why the frame loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Source signalled quit
    Quit,
    /// Player chose Exit on a menu
    Menu,
    /// Frame budget used up
    FrameLimit,
}

/// Owns the frame source and drives the app one frame at a time
pub struct Runner<S: FrameSource> {
    source: S,
    clicks: ClickSlot,
    max_frames: Option<u64>,
}

impl<S: FrameSource> Runner<S> {
    pub fn new(source: S, clicks: ClickSlot) -> Self {
        Self {
            source,
            clicks,
            max_frames: None,
        }
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Runs until quit, menu exit, the frame budget, or a capture failure.
    /// The source is dropped on return either way.
    pub fn run<K: EventSink>(self, app: &mut App, sink: &mut K) -> Result<Exit, CaptureError> {
        let Runner {
            mut source,
            clicks,
            max_frames,
        } = self;
        let mut frames = 0u64;

        loop {
            if max_frames.is_some_and(|max| frames >= max) {
                return Ok(Exit::FrameLimit);
            }
            let frame = match source.next_frame() {
                Ok(SourceEvent::Frame(frame)) => frame,
                Ok(SourceEvent::Quit) => return Ok(Exit::Quit),
                Err(err) => {
                    tracing::error!(%err, frames, "capture failed, stopping");
                    return Err(err);
                }
            };
            frames += 1;

            let click = clicks.take();
            if app.on_frame(&frame, click, sink).is_break() {
                return Ok(Exit::Menu);
            }
        }
    }
}
