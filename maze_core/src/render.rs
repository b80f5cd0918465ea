//! Output side of the engine: the sink a front end implements to show the maze.

use crate::{
    ObjectKind, Position,
    entity::{Counter, Entity, EntityKind, EntityState},
    map::{MazeMap, Tile},
};

/// Image identifiers a renderer maps to its own assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Wall,
    Path,
    Player,
    Guard,
    Object(ObjectKind),
}

impl From<Tile> for Sprite {
    fn from(tile: Tile) -> Self {
        match tile {
            Tile::Wall => Sprite::Wall,
            Tile::Path => Sprite::Path,
        }
    }
}

impl From<&Entity> for Sprite {
    fn from(entity: &Entity) -> Self {
        match entity.kind {
            EntityKind::Player => Sprite::Player,
            EntityKind::Guard => Sprite::Guard,
            EntityKind::Object(kind) => Sprite::Object(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColor {
    White,
    Green,
    Yellow,
    Red,
}

/// Where a line of text goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPlacement {
    Centered,
    /// Left edge of the given tile.
    At(Position),
}

/// Sink for everything the session wants shown.
///
/// Draw calls accumulate until [`RenderPort::present`] is called. Pixel based
/// renderers place a tile at [`Position::to_pixels`].
pub trait RenderPort {
    /// Called once per level load, before the first draw.
    fn set_dimensions(&mut self, _width: usize, _height: usize) {}

    fn draw_tile(&mut self, sprite: Sprite, position: Position);

    fn draw_text(&mut self, text: &str, color: TextColor, placement: TextPlacement);

    fn present(&mut self);
}

/// Draws every maze tile, then the guard, the player, the remaining objects
/// and the counter line. Does not present.
pub fn draw_scene<R>(render: &mut R, maze: &MazeMap, entities: &EntityState, counter: &Counter)
where
    R: RenderPort + ?Sized,
{
    for (pos, tile) in maze.tiles() {
        render.draw_tile(tile.into(), pos);
    }
    let guard = entities.guard();
    render.draw_tile(guard.into(), guard.position);
    let player = entities.player();
    render.draw_tile(player.into(), player.position);
    for object in entities.remaining_objects() {
        render.draw_tile(object.into(), object.position);
    }
    render.draw_text(
        &counter.text(),
        TextColor::White,
        TextPlacement::At(Position::new(0, maze.height().saturating_sub(1))),
    );
}

/// One recorded call on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    Dimensions { width: usize, height: usize },
    Tile { sprite: Sprite, position: Position },
    Text {
        text: String,
        color: TextColor,
        placement: TextPlacement,
    },
    Present,
}

/// Headless renderer that keeps every call, for replays and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub commands: Vec<RenderCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts drawn so far, oldest first.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            RenderCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn presents(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, RenderCommand::Present))
            .count()
    }
}

impl RenderPort for RecordingRenderer {
    fn set_dimensions(&mut self, width: usize, height: usize) {
        self.commands
            .push(RenderCommand::Dimensions { width, height });
    }

    fn draw_tile(&mut self, sprite: Sprite, position: Position) {
        self.commands.push(RenderCommand::Tile { sprite, position });
    }

    fn draw_text(&mut self, text: &str, color: TextColor, placement: TextPlacement) {
        self.commands.push(RenderCommand::Text {
            text: text.to_owned(),
            color,
            placement,
        });
    }

    fn present(&mut self) {
        self.commands.push(RenderCommand::Present);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_draws_tiles_then_characters_then_counter() {
        let maze = MazeMap::parse("#S E#").unwrap();
        let entities = EntityState::new(&maze, [(ObjectKind::Needle, Position::new(2, 0))]);
        let mut render = RecordingRenderer::new();

        draw_scene(&mut render, &maze, &entities, &Counter::new(1));

        let tiles: Vec<&RenderCommand> = render
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Tile { .. }))
            .collect();
        assert_eq!(tiles.len(), 5 + 3);
        assert_eq!(
            tiles[5],
            &RenderCommand::Tile {
                sprite: Sprite::Guard,
                position: Position::new(3, 0)
            }
        );
        assert_eq!(
            tiles[7],
            &RenderCommand::Tile {
                sprite: Sprite::Object(ObjectKind::Needle),
                position: Position::new(2, 0)
            }
        );
        assert_eq!(
            render.commands.last(),
            Some(&RenderCommand::Text {
                text: "Collected objects: 0/1".to_owned(),
                color: TextColor::White,
                placement: TextPlacement::At(Position::new(0, 0)),
            })
        );
        assert_eq!(render.presents(), 0);
    }
}
