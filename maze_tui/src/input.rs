use std::{collections::HashSet, time::Duration};

use maze_core::{Direction, driver::InputPort};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Keyboard state read from crossterm events.
///
/// With key release reporting, a direction stays held from press to release.
/// Without it, a direction counts as held for the tick its press arrived in.
#[derive(Debug)]
pub struct KeyboardInput {
    key_release: bool,
    held: HashSet<Direction>,
    pressed: HashSet<Direction>,
    quit: bool,
}

impl KeyboardInput {
    pub fn new(key_release: bool) -> Self {
        KeyboardInput {
            key_release,
            held: HashSet::new(),
            pressed: HashSet::new(),
            quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc if key.kind != KeyEventKind::Release => {
                self.quit = true;
                return;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                return;
            }
            _ => {}
        }

        let Some(direction) = direction_for(key.code) else {
            return;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.pressed.insert(direction);
                if self.key_release {
                    self.held.insert(direction);
                }
            }
            KeyEventKind::Release => {
                self.held.remove(&direction);
            }
        }
    }

    /// Directions to act on this tick. A tap shorter than a tick still
    /// counts once.
    fn take_held(&mut self) -> Vec<Direction> {
        let directions =
            Direction::in_processing_order(self.held.iter().chain(self.pressed.iter()).copied());
        self.pressed.clear();
        directions
    }
}

impl InputPort for KeyboardInput {
    fn poll_held_directions(&mut self) -> Vec<Direction> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!("Failed to read terminal event: {}", err);
                        self.quit = true;
                        break;
                    }
                },
                Ok(false) => break,
                Err(err) => {
                    tracing::error!("Failed to poll terminal events: {}", err);
                    self.quit = true;
                    break;
                }
            }
        }

        self.take_held()
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn press_and_release_track_held_keys() {
        let mut input = KeyboardInput::new(true);
        input.handle_key(key(KeyCode::Down, KeyEventKind::Press));
        input.handle_key(key(KeyCode::Left, KeyEventKind::Press));
        assert_eq!(input.take_held(), vec![Direction::Left, Direction::Down]);
        assert_eq!(input.take_held(), vec![Direction::Left, Direction::Down]);

        input.handle_key(key(KeyCode::Left, KeyEventKind::Release));
        assert_eq!(input.take_held(), vec![Direction::Down]);
    }

    #[test]
    fn press_without_release_reporting_lasts_one_tick() {
        let mut input = KeyboardInput::new(false);
        input.handle_key(key(KeyCode::Right, KeyEventKind::Press));
        assert_eq!(input.take_held(), vec![Direction::Right]);
        assert!(input.take_held().is_empty());
    }

    #[test]
    fn quick_tap_still_counts_once() {
        let mut input = KeyboardInput::new(true);
        input.handle_key(key(KeyCode::Up, KeyEventKind::Press));
        input.handle_key(key(KeyCode::Up, KeyEventKind::Release));
        assert_eq!(input.take_held(), vec![Direction::Up]);
        assert!(input.take_held().is_empty());
    }

    #[test]
    fn quit_keys() {
        let mut input = KeyboardInput::new(false);
        input.handle_key(key(KeyCode::Char('x'), KeyEventKind::Press));
        assert!(!input.quit_requested());
        input.handle_key(key(KeyCode::Esc, KeyEventKind::Press));
        assert!(input.quit_requested());

        let mut input = KeyboardInput::new(false);
        input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.quit_requested());
    }
}
