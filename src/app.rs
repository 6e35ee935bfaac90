use std::ops::ControlFlow;

use crate::engine::{FrameInput, GameplayEngine, Status};
use crate::events::EventSink;
use crate::runtime::Click;
use crate::session::GameSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Menu,
    Instructions,
    Playing,
    GameOver,
}

/// What a click on a screen resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    Instructions,
    Back,
    Restart,
    Exit,
}

/// Display collaborator that knows where its buttons are drawn
pub trait ButtonMap {
    fn hit(&self, screen: Screen, click: Click) -> Option<MenuAction>;
}

pub struct App {
    engine: GameplayEngine,
    screen: Screen,
    session: Option<GameSession>,
    buttons: Option<Box<dyn ButtonMap>>,
}

impl App {
    pub fn new(engine: GameplayEngine) -> Self {
        Self {
            engine,
            screen: Screen::Menu,
            session: None,
            buttons: None,
        }
    }

    pub fn with_buttons(mut self, buttons: Box<dyn ButtonMap>) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Current session, or the finished one while on the game-over screen
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn engine(&self) -> &GameplayEngine {
        &self.engine
    }

    /// Fresh session, replacing any previous one wholesale.
    pub fn start<K: EventSink>(&mut self, sink: &mut K) {
        self.session = Some(self.engine.new_session());
        self.screen = Screen::Playing;
        sink.on_session_start();
    }

    /// One frame of the screen state machine. `click` is the drained pending click,
    /// already cleared from its slot whether or not it hits anything here.
    pub fn on_frame<K: EventSink>(
        &mut self,
        frame: &FrameInput,
        click: Option<Click>,
        sink: &mut K,
    ) -> ControlFlow<()> {
        let action = match (click, self.buttons.as_ref()) {
            (Some(click), Some(buttons)) => buttons.hit(self.screen, click),
            _ => None,
        };

        match (self.screen, action) {
            (Screen::Menu, Some(MenuAction::Start)) => self.start(sink),
            (Screen::Menu, Some(MenuAction::Instructions)) => self.screen = Screen::Instructions,
            (Screen::Menu, Some(MenuAction::Exit)) => return ControlFlow::Break(()),
            (Screen::Instructions, Some(MenuAction::Back)) => self.screen = Screen::Menu,
            (Screen::GameOver, Some(MenuAction::Restart)) => self.start(sink),
            (Screen::GameOver, Some(MenuAction::Exit)) => return ControlFlow::Break(()),
            (Screen::Playing, _) => self.play(frame, sink),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn play<K: EventSink>(&mut self, frame: &FrameInput, sink: &mut K) {
        let Some(session) = self.session.as_mut() else {
            self.screen = Screen::Menu;
            return;
        };
        match self.engine.step(session, frame) {
            Ok(outcome) => {
                for event in &outcome.events {
                    sink.on_event(event);
                }
                if let Status::GameOver(_) = outcome.status {
                    self.screen = Screen::GameOver;
                }
            }
            Err(err) => {
                tracing::warn!(%err, "stepped a finished session");
                self.screen = Screen::GameOver;
            }
        }
    }
}
