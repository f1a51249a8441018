use std::time::Duration;
use tracing::trace;

use crate::domain::{Action, Config, JmsvError};
use ratatui::crossterm::event::{self, Event, KeyCode};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &Config) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self) -> Result<Option<Action>, JmsvError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => self.handle_key(key),
                Event::Resize(width, height) => Some(Action::Resize(width as usize, height as usize)),
                _ => None,
            });
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Action> {
        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::MoveRight),
            KeyCode::PageUp => Some(Action::MovePageUp),
            KeyCode::PageDown => Some(Action::MovePageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Action::MoveEnd),
            KeyCode::Char('t') => Some(Action::ToggleLongFormat),
            KeyCode::Char('s') => Some(Action::Selector),
            _ => None,
        };
        trace!("Mapped: {key:?} => {action:?}");
        action
    }
}
