//! The tick loop: poll input, update the session, render, sleep.

use std::{
    thread,
    time::{Duration, Instant},
};

use rand::Rng;
use tracing::{debug, info};

use crate::{
    Direction,
    config::GameConfig,
    entity::SessionOutcome,
    render::RenderPort,
    session::{GameSession, Phase, SessionError},
};

/// Longest single sleep while holding a banner or outcome message, so the
/// quit signal is still noticed promptly.
const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// Source of player input.
///
/// Polling must not block and must drain every pending event.
pub trait InputPort {
    /// Directions held down right now.
    fn poll_held_directions(&mut self) -> Vec<Direction>;

    /// Whether the player asked to leave, as of the last poll.
    fn quit_requested(&self) -> bool;
}

/// Why [`Driver::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The quit signal was seen. The session is left as it was.
    Quit,
    /// The session terminated on its own.
    Completed,
}

/// Runs a [`GameSession`] against a pair of ports at a fixed minimum tick
/// interval.
#[derive(Debug)]
pub struct Driver<I, P> {
    input: I,
    render: P,
    config: GameConfig,
}

impl<I: InputPort, P: RenderPort> Driver<I, P> {
    pub fn new(input: I, render: P, config: GameConfig) -> Self {
        Driver {
            input,
            render,
            config,
        }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn render(&self) -> &P {
        &self.render
    }

    pub fn into_parts(self) -> (I, P) {
        (self.input, self.render)
    }

    /// Plays `session` until it terminates or the player quits.
    ///
    /// # Errors
    ///
    /// Propagates errors from loading the next level.
    pub fn run<R: Rng>(&mut self, session: &mut GameSession<R>) -> Result<RunExit, SessionError> {
        info!(
            level = session.level_number(),
            tick_ms = self.config.tick_interval_ms,
            "Driver started"
        );
        if self.show_level(session) {
            return Ok(self.quit());
        }

        let tick_interval = self.config.tick_interval();
        loop {
            let tick_started = Instant::now();

            let held = self.input.poll_held_directions();
            if self.input.quit_requested() {
                return Ok(self.quit());
            }

            let outcome = session.tick(&held, &mut self.render);
            if outcome != SessionOutcome::InProgress {
                session.announce_outcome(&mut self.render);
                let outcome_pause = self.config.outcome_pause();
                if self.pause(outcome_pause) {
                    return Ok(self.quit());
                }
                match session.advance()? {
                    Phase::Terminated => {
                        info!("Driver finished");
                        return Ok(RunExit::Completed);
                    }
                    _ => {
                        if self.show_level(session) {
                            return Ok(self.quit());
                        }
                    }
                }
            }

            if let Some(remaining) = tick_interval.checked_sub(tick_started.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    /// Banner for the current level, held for the intro delay, then the bare
    /// scene. Returns `true` if the player quit meanwhile.
    fn show_level<R: Rng>(&mut self, session: &GameSession<R>) -> bool {
        session.announce_level(&mut self.render);
        let level_intro = self.config.level_intro();
        if self.pause(level_intro) {
            return true;
        }
        session.draw(&mut self.render);
        false
    }

    /// Sleeps for `duration` while still draining input. Returns `true` if
    /// the quit signal was raised.
    fn pause(&mut self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.input.quit_requested();
        }
        debug!(ms = duration.as_millis(), "Pausing");
        let deadline = Instant::now() + duration;
        loop {
            self.input.poll_held_directions();
            if self.input.quit_requested() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(PAUSE_SLICE));
        }
    }

    fn quit(&self) -> RunExit {
        info!("Quit requested");
        RunExit::Quit
    }
}
