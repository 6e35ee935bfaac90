use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::engine::FrameInput;
use crate::gesture::Gesture;
use crate::runtime::{CaptureError, FrameSource, SourceEvent};

#[derive(Debug, Deserialize)]
struct FrameRow {
    hand_detected: bool,
    hand_x: Option<i32>,
    hand_y: Option<i32>,
    gesture: Option<String>,
}

impl FrameRow {
    fn into_input(self, line: usize) -> Result<FrameInput, CaptureError> {
        let gesture = match self.gesture.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("unknown") => None,
            Some(s) => Some(
                s.parse::<Gesture>()
                    .map_err(|e| CaptureError::Read(format!("row {line}: {e}")))?,
            ),
        };
        if !self.hand_detected {
            return Ok(FrameInput::no_hand());
        }
        Ok(FrameInput::hand(
            self.hand_x.unwrap_or(-1),
            self.hand_y.unwrap_or(-1),
            gesture,
        ))
    }
}

/// Replays recorded tracker output from CSV (`hand_detected,hand_x,hand_y,gesture`).
/// End of script reads as Quit.
pub struct ScriptedFrameSource<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, FrameRow>,
    line: usize,
}

impl ScriptedFrameSource<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            CaptureError::Unavailable(format!("{}: {e}", path.as_ref().display()))
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> ScriptedFrameSource<R> {
    pub fn from_reader(reader: R) -> Self {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader)
            .into_deserialize();
        Self { rows, line: 0 }
    }
}

impl<R: Read> FrameSource for ScriptedFrameSource<R> {
    fn next_frame(&mut self) -> Result<SourceEvent, CaptureError> {
        match self.rows.next() {
            None => Ok(SourceEvent::Quit),
            Some(row) => {
                self.line += 1;
                Ok(SourceEvent::Frame(row?.into_input(self.line)?))
            }
        }
    }
}
