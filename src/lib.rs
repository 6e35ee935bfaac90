// Library surface for the binary, headless integration tests and embedding in a
// camera/render front end.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod obstacle;
pub mod retry;
pub mod runtime;
pub mod script;
pub mod session;

pub use engine::{FrameInput, GameplayEngine, StepOutcome};
pub use session::GameSession;
