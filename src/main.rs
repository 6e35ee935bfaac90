use clap::Parser;
use handdash::{
    app::App,
    config::{ConfigStore, FileConfigStore, GameConfig},
    engine::GameplayEngine,
    events::{EventSink, FailReason, GameEvent, LogSink, RecordingSink},
    history::{ResultsLog, SessionResult},
    runtime::{CaptureError, ClickSlot, Exit, Runner},
    script::ScriptedFrameSource,
    session::GameSession,
};
use itertools::Itertools;
use std::{error::Error, path::PathBuf};
use tracing_subscriber::EnvFilter;

/// headless driver for the gesture obstacle game: replays recorded tracker frames
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Replays a CSV script of tracker frames (hand_detected,hand_x,hand_y,gesture) through the gameplay engine and prints the session summary."
)]
pub struct Cli {
    /// CSV frame script standing in for the camera
    #[clap(short = 's', long)]
    script: Option<PathBuf>,

    /// game config JSON (defaults to the per-user config file)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// field width in pixels
    #[clap(long, default_value_t = 1280)]
    width: u32,

    /// field height in pixels
    #[clap(long, default_value_t = 720)]
    height: u32,

    /// seed for obstacle selection, for reproducible runs
    #[clap(long)]
    seed: Option<u64>,

    /// stop after this many frames
    #[clap(long)]
    max_frames: Option<u64>,

    /// do not append the result to the results log
    #[clap(long)]
    no_history: bool,

    /// write the effective config back to the config file and exit
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

/// Logs every event and keeps a copy for the summary
#[derive(Default)]
struct Sinks {
    log: LogSink,
    record: RecordingSink,
}

impl EventSink for Sinks {
    fn on_event(&mut self, event: &GameEvent) {
        self.log.on_event(event);
        self.record.on_event(event);
    }

    fn on_session_start(&mut self) {
        self.log.on_session_start();
        self.record.on_session_start();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = cli.config_store();
    let config: GameConfig = store.load();

    if cli.save_config {
        store.save(&config)?;
        println!("config written to {}", store.path().display());
        return Ok(());
    }

    let engine = match cli.seed {
        Some(seed) => GameplayEngine::seeded(config, cli.width, cli.height, seed)?,
        None => GameplayEngine::new(config, cli.width, cli.height)?,
    };

    let Some(script) = cli.script.as_ref() else {
        return Err(CaptureError::Unavailable(
            "no camera backend in this build; pass --script <frames.csv>".into(),
        )
        .into());
    };
    let source = ScriptedFrameSource::open(script)?;

    let mut app = App::new(engine);
    let mut sinks = Sinks::default();
    app.start(&mut sinks);

    let exit = Runner::new(source, ClickSlot::new())
        .with_max_frames(cli.max_frames)
        .run(&mut app, &mut sinks)?;
    tracing::debug!(?exit, "frame loop finished");

    let Some(session) = app.session() else {
        return Ok(());
    };

    println!("score: {}", session.score);
    println!("fails: {}", session.fails);
    println!("frames: {}", session.frames);
    match session.game_over() {
        Some(reason) => println!("game over: {}", reason.message()),
        None if exit == Exit::FrameLimit => println!("stopped at frame limit"),
        None => println!("script ended"),
    }

    let warnings = sinks
        .record
        .events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Warning(reason) => Some(*reason),
            _ => None,
        })
        .counts();
    for (reason, n) in warnings
        .into_iter()
        .sorted_by_key(|(r, _): &(FailReason, usize)| r.to_string())
    {
        println!("  {reason}: {n}");
    }

    if !cli.no_history {
        match ResultsLog::new() {
            Some(log) => record_result(&log, session),
            None => tracing::warn!("no state directory, result not recorded"),
        }
    }

    Ok(())
}

/// Appends the session to the results log and reports the best score so far
fn record_result(log: &ResultsLog, session: &GameSession) {
    if let Err(err) = log.append(&SessionResult::from_session(session)) {
        tracing::warn!(%err, "could not record result");
        return;
    }
    match log.best_score() {
        Ok(Some(best)) => println!("best score: {best}"),
        Ok(None) => {}
        Err(err) => tracing::warn!(%err, "could not read results log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["handdash"]);

        assert_eq!(cli.script, None);
        assert_eq!(cli.config, None);
        assert_eq!(cli.width, 1280);
        assert_eq!(cli.height, 720);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.max_frames, None);
        assert!(!cli.no_history);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from([
            "handdash",
            "-s",
            "frames.csv",
            "--seed",
            "42",
            "--width",
            "640",
            "--height",
            "480",
            "--max-frames",
            "100",
            "--no-history",
        ]);
        assert_eq!(cli.script, Some(PathBuf::from("frames.csv")));
        assert_eq!(cli.seed, Some(42));
        assert_eq!((cli.width, cli.height), (640, 480));
        assert_eq!(cli.max_frames, Some(100));
        assert!(cli.no_history);
    }

    #[test]
    fn test_cli_config_store_uses_given_path() {
        let cli = Cli::parse_from(["handdash", "--config", "/tmp/x/config.json"]);
        assert_eq!(
            cli.config_store().path(),
            std::path::Path::new("/tmp/x/config.json")
        );
    }

    #[test]
    fn test_record_result_appends_and_keeps_best() {
        use handdash::config::GameConfig;
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let log = ResultsLog::with_path(dir.path().join("results.csv"));
        let mut engine = GameplayEngine::seeded(GameConfig::default(), 1280, 720, 4).unwrap();

        let mut session = engine.new_session();
        session.score = 7;
        record_result(&log, &session);
        let mut session = engine.new_session();
        session.score = 2;
        record_result(&log, &session);

        assert_eq!(log.read_all().unwrap().len(), 2);
        assert_eq!(log.best_score().unwrap(), Some(7));
    }

    #[test]
    fn test_sinks_fan_out() {
        let mut sinks = Sinks::default();
        sinks.on_session_start();
        sinks.on_event(&GameEvent::Warning(FailReason::HandNotInZone));
        assert_eq!(sinks.record.sessions_started, 1);
        assert_eq!(sinks.record.events.len(), 1);
    }
}
