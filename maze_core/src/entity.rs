use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Direction, ObjectKind, Position, map::MazeMap};

/// What an entity is. Behaviour is keyed off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Guard,
    Object(ObjectKind),
}

/// Anything drawn on top of the maze tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Position,
}

/// Result of asking the player to take one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Blocked,
    Moved(Position),
}

/// Where a session stands after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    InProgress,
    Won,
    Lost,
}

/// Positions of the player, the guard and the objects still on the ground.
#[derive(Debug, Clone)]
pub struct EntityState {
    player: Entity,
    guard: Entity,
    objects: HashMap<Position, Entity>,
}

impl EntityState {
    /// Puts the player on the maze start, the guard on the exit and each object
    /// on its tile.
    ///
    /// Object tiles must be walkable and distinct from start and exit, which is
    /// what [`crate::placement::sample`] produces.
    pub fn new<I>(maze: &MazeMap, objects: I) -> Self
    where
        I: IntoIterator<Item = (ObjectKind, Position)>,
    {
        let objects: HashMap<Position, Entity> = objects
            .into_iter()
            .map(|(kind, position)| {
                debug_assert!(maze.is_walkable(position), "object placed on a wall");
                debug_assert!(
                    position != maze.start() && position != maze.exit(),
                    "object placed on start or exit"
                );
                (
                    position,
                    Entity {
                        kind: EntityKind::Object(kind),
                        position,
                    },
                )
            })
            .collect();

        EntityState {
            player: Entity {
                kind: EntityKind::Player,
                position: maze.start(),
            },
            guard: Entity {
                kind: EntityKind::Guard,
                position: maze.exit(),
            },
            objects,
        }
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn guard(&self) -> &Entity {
        &self.guard
    }

    pub fn player_position(&self) -> Position {
        self.player.position
    }

    /// Objects not yet picked up, in no particular order.
    pub fn remaining_objects(&self) -> impl Iterator<Item = &Entity> {
        self.objects.values()
    }

    pub fn remaining_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object_at(&self, position: Position) -> Option<ObjectKind> {
        match self.objects.get(&position)?.kind {
            EntityKind::Object(kind) => Some(kind),
            EntityKind::Player | EntityKind::Guard => None,
        }
    }

    /// Moves the player one tile in `direction` if that tile is walkable.
    ///
    /// Walls and cells outside the maze leave the player where it is.
    pub fn attempt_move(&mut self, maze: &MazeMap, direction: Direction) -> MoveResult {
        match self.player.position.step(direction) {
            Some(candidate) if maze.is_walkable(candidate) => {
                self.player.position = candidate;
                MoveResult::Moved(candidate)
            }
            _ => MoveResult::Blocked,
        }
    }

    /// Removes and returns the object under the player, if any.
    pub fn try_pickup(&mut self) -> Option<ObjectKind> {
        let entity = self.objects.remove(&self.player.position)?;
        match entity.kind {
            EntityKind::Object(kind) => Some(kind),
            EntityKind::Player | EntityKind::Guard => None,
        }
    }

    /// Won or Lost once the player stands on the guard's tile, depending on
    /// whether any object is left.
    pub fn evaluate_outcome(&self) -> SessionOutcome {
        if self.player.position != self.guard.position {
            SessionOutcome::InProgress
        } else if self.objects.is_empty() {
            SessionOutcome::Won
        } else {
            SessionOutcome::Lost
        }
    }
}

/// Count of the objects collected in the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub collected: usize,
    pub total: usize,
}

impl Counter {
    pub fn new(total: usize) -> Self {
        Counter {
            collected: 0,
            total,
        }
    }

    pub fn increment(&mut self) {
        self.collected += 1;
    }

    pub fn text(&self) -> String {
        format!("Collected objects: {}/{}", self.collected, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze() -> MazeMap {
        MazeMap::parse("#####\n#S  #\n#  E#\n#####").unwrap()
    }

    #[test]
    fn player_starts_on_start_and_guard_on_exit() {
        let maze = maze();
        let state = EntityState::new(&maze, []);
        assert_eq!(state.player_position(), maze.start());
        assert_eq!(state.guard().position, maze.exit());
        assert_eq!(state.player().kind, EntityKind::Player);
        assert_eq!(state.guard().kind, EntityKind::Guard);
    }

    #[test]
    fn walls_block_movement() {
        let maze = maze();
        let mut state = EntityState::new(&maze, []);
        assert_eq!(state.attempt_move(&maze, Direction::Left), MoveResult::Blocked);
        assert_eq!(state.attempt_move(&maze, Direction::Up), MoveResult::Blocked);
        assert_eq!(state.player_position(), maze.start());
    }

    #[test]
    fn walkable_target_is_entered_exactly() {
        let maze = maze();
        let mut state = EntityState::new(&maze, []);
        assert_eq!(
            state.attempt_move(&maze, Direction::Right),
            MoveResult::Moved(Position::new(2, 1))
        );
        assert_eq!(state.player_position(), Position::new(2, 1));
    }

    #[test]
    fn leaving_the_grid_is_blocked() {
        let maze = MazeMap::parse("S E").unwrap();
        let mut state = EntityState::new(&maze, []);
        assert_eq!(state.attempt_move(&maze, Direction::Left), MoveResult::Blocked);
        assert_eq!(state.attempt_move(&maze, Direction::Up), MoveResult::Blocked);
        assert_eq!(state.attempt_move(&maze, Direction::Down), MoveResult::Blocked);
        assert_eq!(state.player_position(), Position::new(0, 0));
    }

    #[test]
    fn pickup_removes_once() {
        let maze = maze();
        let tube = Position::new(2, 1);
        let mut state = EntityState::new(&maze, [(ObjectKind::PlasticTube, tube)]);

        assert_eq!(state.try_pickup(), None);
        state.attempt_move(&maze, Direction::Right);
        assert_eq!(state.object_at(tube), Some(ObjectKind::PlasticTube));
        assert_eq!(state.try_pickup(), Some(ObjectKind::PlasticTube));
        assert_eq!(state.try_pickup(), None);
        assert_eq!(state.remaining_count(), 0);
    }

    #[test]
    fn outcome_depends_on_guard_tile_and_remaining_objects() {
        let maze = maze();
        let mut clean = EntityState::new(&maze, []);
        assert_eq!(clean.evaluate_outcome(), SessionOutcome::InProgress);
        clean.attempt_move(&maze, Direction::Right);
        clean.attempt_move(&maze, Direction::Right);
        clean.attempt_move(&maze, Direction::Down);
        assert_eq!(clean.evaluate_outcome(), SessionOutcome::Won);

        let mut carrying = EntityState::new(&maze, [(ObjectKind::Ether, Position::new(1, 2))]);
        carrying.attempt_move(&maze, Direction::Right);
        carrying.attempt_move(&maze, Direction::Right);
        carrying.attempt_move(&maze, Direction::Down);
        assert_eq!(carrying.evaluate_outcome(), SessionOutcome::Lost);
    }

    #[test]
    fn counter_text() {
        let mut counter = Counter::new(4);
        counter.increment();
        assert_eq!(counter.text(), "Collected objects: 1/4");
    }
}
