use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, trace};

use crate::{
    Direction, ObjectKind,
    config::Progression,
    entity::{Counter, EntityState, MoveResult, SessionOutcome},
    map::{MapError, MazeMap},
    placement::{self, PlacementError},
    render::{self, RenderPort, Sprite, TextColor, TextPlacement},
};

/// Errors that prevent a session from being created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No levels to play")]
    NoLevels,
    #[error("Level {level}: {source}")]
    Map {
        level: usize,
        #[source]
        source: MapError,
    },
    #[error("Level {level}: {source}")]
    Placement {
        level: usize,
        #[source]
        source: PlacementError,
    },
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Playing,
    /// Won or Lost, waiting for [`GameSession::advance`].
    Finished(SessionOutcome),
    Terminated,
}

/// Owns the levels, the live entity state and the per-level counter, and
/// sequences one tick at a time.
#[derive(Debug)]
pub struct GameSession<R = StdRng> {
    levels: Vec<MazeMap>,
    objects: Vec<ObjectKind>,
    progression: Progression,
    rng: R,
    level: usize,
    entities: EntityState,
    counter: Counter,
    phase: Phase,
}

impl GameSession<StdRng> {
    /// Session whose object placement is reproducible from `seed`.
    ///
    /// # Errors
    ///
    /// See [`GameSession::new`].
    pub fn seeded(
        levels: Vec<MazeMap>,
        objects: Vec<ObjectKind>,
        progression: Progression,
        seed: u64,
    ) -> Result<Self, SessionError> {
        Self::new(levels, objects, progression, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameSession<R> {
    /// Validates every level and loads the first one.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoLevels`] for an empty campaign, and
    /// [`SessionError::Placement`] when a level has fewer free walkable tiles
    /// than there are objects. Nothing is created on error.
    pub fn new(
        levels: Vec<MazeMap>,
        objects: Vec<ObjectKind>,
        progression: Progression,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        let first = levels.first().ok_or(SessionError::NoLevels)?;
        for (index, maze) in levels.iter().enumerate() {
            let available =
                placement::candidates(maze.walkable(), &[maze.start(), maze.exit()]).len();
            if available < objects.len() {
                return Err(SessionError::Placement {
                    level: index + 1,
                    source: PlacementError::InsufficientTiles {
                        requested: objects.len(),
                        available,
                    },
                });
            }
        }

        let entities = populate(first, &objects, &mut rng).map_err(|source| {
            SessionError::Placement { level: 1, source }
        })?;
        let counter = Counter::new(objects.len());
        info!(levels = levels.len(), objects = objects.len(), "Session created");

        Ok(GameSession {
            levels,
            objects,
            progression,
            rng,
            level: 0,
            entities,
            counter,
            phase: Phase::Playing,
        })
    }

    /// Parses each text as one level, in order.
    ///
    /// # Errors
    ///
    /// [`SessionError::Map`] naming the first level that fails to parse, or
    /// any error of [`GameSession::new`].
    pub fn from_texts<S>(
        texts: &[S],
        objects: Vec<ObjectKind>,
        progression: Progression,
        rng: R,
    ) -> Result<Self, SessionError>
    where
        S: AsRef<str>,
    {
        let levels = texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                MazeMap::parse(text.as_ref()).map_err(|source| SessionError::Map {
                    level: index + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels, objects, progression, rng)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 1-based number of the current level.
    pub fn level_number(&self) -> usize {
        self.level + 1
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn maze(&self) -> &MazeMap {
        &self.levels[self.level]
    }

    pub fn entities(&self) -> &EntityState {
        &self.entities
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// Processes the held directions of one tick in Left, Right, Up, Down
    /// order.
    ///
    /// Every successful move is followed by a pickup check and an outcome
    /// check. The first Won or Lost ends the tick and drops the directions
    /// still queued. Outside [`Phase::Playing`] nothing moves.
    pub fn tick<P>(&mut self, held: &[Direction], render: &mut P) -> SessionOutcome
    where
        P: RenderPort + ?Sized,
    {
        match self.phase {
            Phase::Playing => {}
            Phase::Finished(outcome) => return outcome,
            Phase::Loading | Phase::Terminated => return SessionOutcome::InProgress,
        }

        for direction in Direction::in_processing_order(held.iter().copied()) {
            let position = match self.entities.attempt_move(&self.levels[self.level], direction) {
                MoveResult::Blocked => {
                    trace!(?direction, "Move blocked");
                    continue;
                }
                MoveResult::Moved(position) => position,
            };
            debug!(?direction, x = position.x, y = position.y, "Player moved");

            if let Some(object) = self.entities.try_pickup() {
                self.counter.increment();
                debug!(
                    object = object.label(),
                    collected = self.counter.collected,
                    total = self.counter.total,
                    "Object picked up"
                );
            }
            self.draw(render);

            let outcome = self.entities.evaluate_outcome();
            if outcome != SessionOutcome::InProgress {
                info!(level = self.level_number(), ?outcome, "Level finished");
                self.phase = Phase::Finished(outcome);
                return outcome;
            }
        }
        SessionOutcome::InProgress
    }

    /// Leaves a finished level: loads the next or the same level, or
    /// terminates, according to the progression policy.
    ///
    /// Returns the new phase. Has no effect unless the level is finished.
    ///
    /// # Errors
    ///
    /// Propagates placement failures from loading the level.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        let Phase::Finished(outcome) = self.phase else {
            return Ok(self.phase);
        };

        let next = match (self.progression, outcome) {
            (Progression::Campaign, SessionOutcome::Won) if self.level + 1 < self.levels.len() => {
                Some(self.level + 1)
            }
            (_, SessionOutcome::Lost) => Some(self.level),
            _ => None,
        };

        match next {
            Some(level) => self.load_level(level)?,
            None => {
                info!("Session terminated");
                self.phase = Phase::Terminated;
            }
        }
        Ok(self.phase)
    }

    fn load_level(&mut self, level: usize) -> Result<(), SessionError> {
        self.phase = Phase::Loading;
        self.entities = populate(&self.levels[level], &self.objects, &mut self.rng)
            .map_err(|source| SessionError::Placement {
                level: level + 1,
                source,
            })?;
        self.counter = Counter::new(self.objects.len());
        self.level = level;
        self.phase = Phase::Playing;
        info!(level = self.level_number(), "Level loaded");
        Ok(())
    }

    /// Redraws the whole scene and presents it.
    pub fn draw<P>(&self, render: &mut P)
    where
        P: RenderPort + ?Sized,
    {
        render::draw_scene(render, self.maze(), &self.entities, &self.counter);
        render.present();
    }

    /// Full scene of a freshly loaded level with its `LEVEL n` banner.
    pub fn announce_level<P>(&self, render: &mut P)
    where
        P: RenderPort + ?Sized,
    {
        let maze = self.maze();
        render.set_dimensions(maze.width(), maze.height());
        render::draw_scene(render, maze, &self.entities, &self.counter);
        render.draw_text(
            &format!("LEVEL {}", self.level_number()),
            TextColor::Green,
            TextPlacement::Centered,
        );
        render.present();
    }

    /// Win or game over message for a finished level.
    pub fn announce_outcome<P>(&self, render: &mut P)
    where
        P: RenderPort + ?Sized,
    {
        match self.phase {
            Phase::Finished(SessionOutcome::Won) => {
                render.draw_text("YOU WIN!", TextColor::Yellow, TextPlacement::Centered);
            }
            Phase::Finished(SessionOutcome::Lost) => {
                let guard = self.entities.guard();
                render.draw_tile(Sprite::Guard, guard.position);
                render.draw_text("GAME OVER", TextColor::Red, TextPlacement::Centered);
            }
            _ => return,
        }
        render.present();
    }
}

/// Fresh entities for `maze`, objects zipped against a random draw of tiles.
fn populate<R>(
    maze: &MazeMap,
    objects: &[ObjectKind],
    rng: &mut R,
) -> Result<EntityState, PlacementError>
where
    R: Rng + ?Sized,
{
    let tiles = placement::sample(
        maze.walkable(),
        &[maze.start(), maze.exit()],
        objects.len(),
        rng,
    )?;
    Ok(EntityState::new(
        maze,
        objects.iter().copied().zip(tiles),
    ))
}
