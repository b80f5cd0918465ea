use rand::{Rng, seq::SliceRandom};

use crate::Position;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("Cannot place {requested} objects: only {available} free walkable tiles")]
    InsufficientTiles { requested: usize, available: usize },
}

/// Candidate tiles for placement: `walkable` minus `exclude`, de-duplicated and
/// sorted so that a seeded draw is reproducible whatever the input order.
pub fn candidates<I>(walkable: I, exclude: &[Position]) -> Vec<Position>
where
    I: IntoIterator<Item = Position>,
{
    let mut tiles: Vec<Position> = walkable
        .into_iter()
        .filter(|pos| !exclude.contains(pos))
        .collect();
    tiles.sort_unstable();
    tiles.dedup();
    tiles
}

/// Draws `count` distinct tiles uniformly at random, without replacement, from
/// `walkable` minus `exclude`.
///
/// # Errors
///
/// Returns [`PlacementError::InsufficientTiles`] if fewer than `count` tiles
/// remain after exclusion.
pub fn sample<I, R>(
    walkable: I,
    exclude: &[Position],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Position>, PlacementError>
where
    I: IntoIterator<Item = Position>,
    R: Rng + ?Sized,
{
    let mut tiles = candidates(walkable, exclude);
    if count > tiles.len() {
        return Err(PlacementError::InsufficientTiles {
            requested: count,
            available: tiles.len(),
        });
    }
    tiles.shuffle(rng);
    tiles.truncate(count);
    Ok(tiles)
}
