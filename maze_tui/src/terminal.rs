use std::io::{self, Stdout};

use anyhow::Result;
use maze_core::{
    ObjectKind, Position,
    render::{RenderPort, Sprite, TextColor, TextPlacement},
};
use ratatui::{
    crossterm::{
        event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
        execute,
        terminal::{
            EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            supports_keyboard_enhancement,
        },
    },
    prelude::*,
    widgets::*,
};

/// What the next [`RenderPort::present`] puts on screen.
#[derive(Debug, Default)]
struct Scene {
    width: usize,
    height: usize,
    cells: Vec<Option<Sprite>>,
    status: Option<(String, TextColor)>,
    banner: Option<(String, TextColor)>,
}

/// Draws the maze in the terminal, one character per tile.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    key_release: bool,
    scene: Scene,
    error: Option<io::Error>,
}

impl TerminalRenderer {
    /// Switches the terminal to raw mode on the alternate screen, asking for
    /// key release events where the terminal supports them.
    pub fn setup() -> Result<Self> {
        enable_raw_mode()?;
        Self::enter(io::stdout()).inspect_err(|_| {
            // Leave the shell usable if the screen could not be taken over.
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        })
    }

    fn enter(mut stdout: Stdout) -> Result<Self> {
        execute!(stdout, EnterAlternateScreen)?;
        let key_release = supports_keyboard_enhancement().unwrap_or(false);
        if key_release {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        tracing::debug!(key_release, "Terminal ready");

        let backend = CrosstermBackend::new(stdout);
        Ok(TerminalRenderer {
            terminal: Terminal::new(backend)?,
            key_release,
            scene: Scene::default(),
            error: None,
        })
    }

    /// Whether key release events will be reported.
    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    /// Restores the terminal, then reports the first failed draw, if any.
    pub fn restore(mut self) -> Result<()> {
        if self.key_release {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;

        match self.error.take() {
            Some(err) => Err(anyhow::Error::new(err).context("Failed to draw the maze")),
            None => Ok(()),
        }
    }
}

impl RenderPort for TerminalRenderer {
    fn set_dimensions(&mut self, width: usize, height: usize) {
        self.scene.width = width;
        self.scene.height = height;
        self.scene.cells = vec![None; width * height];
        self.scene.banner = None;
    }

    fn draw_tile(&mut self, sprite: Sprite, position: Position) {
        if position.x < self.scene.width && position.y < self.scene.height {
            let index = position.y * self.scene.width + position.x;
            self.scene.cells[index] = Some(sprite);
        }
    }

    fn draw_text(&mut self, text: &str, color: TextColor, placement: TextPlacement) {
        let line = Some((text.to_owned(), color));
        match placement {
            TextPlacement::Centered => self.scene.banner = line,
            TextPlacement::At(_) => self.scene.status = line,
        }
    }

    fn present(&mut self) {
        let scene = &self.scene;
        if let Err(err) = self.terminal.draw(|frame| ui(frame, scene)) {
            tracing::error!("Failed to draw frame: {}", err);
            self.error.get_or_insert(err);
        }
        // A banner lasts until the next frame.
        self.scene.banner = None;
    }
}

/// Renders the maze, the status line and the help line.
fn ui(frame: &mut Frame, scene: &Scene) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Area for the maze
            Constraint::Length(1), // Collected objects
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let lines: Vec<Line> = (0..scene.height)
        .map(|y| {
            let spans: Vec<Span> = (0..scene.width)
                .map(|x| match scene.cells[y * scene.width + x] {
                    Some(sprite) => sprite_span(sprite),
                    None => Span::raw(" "),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let maze = Paragraph::new(lines)
        .block(Block::default().title("Maze").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(maze, main_layout[0]);

    if let Some((text, color)) = &scene.status {
        let status = Paragraph::new(text.as_str())
            .style(Style::default().fg(text_color(*color)))
            .alignment(Alignment::Center);
        frame.render_widget(status, main_layout[1]);
    }

    let help = Paragraph::new("Arrow keys to move, 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center);
    frame.render_widget(help, main_layout[2]);

    if let Some((text, color)) = &scene.banner {
        let area = centered(main_layout[0], banner_width(text), 3);
        let banner = Paragraph::new(text.as_str())
            .style(Style::default().fg(text_color(*color)).bold())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(Clear, area);
        frame.render_widget(banner, area);
    }
}

fn sprite_span(sprite: Sprite) -> Span<'static> {
    match sprite {
        Sprite::Wall => Span::styled("#", Style::default().fg(Color::DarkGray)),
        Sprite::Path => Span::raw(" "),
        Sprite::Player => Span::styled("@", Style::default().fg(Color::Red).bold()),
        Sprite::Guard => Span::styled("G", Style::default().fg(Color::Blue).bold()),
        Sprite::Object(kind) => {
            let symbol = match kind {
                ObjectKind::Needle => "n",
                ObjectKind::Syringe => "s",
                ObjectKind::PlasticTube => "t",
                ObjectKind::Ether => "e",
            };
            Span::styled(symbol, Style::default().fg(Color::Yellow))
        }
    }
}

fn text_color(color: TextColor) -> Color {
    match color {
        TextColor::White => Color::White,
        TextColor::Green => Color::Green,
        TextColor::Yellow => Color::LightYellow,
        TextColor::Red => Color::Red,
    }
}

/// Text plus border and one column of padding on each side.
fn banner_width(text: &str) -> u16 {
    u16::try_from(text.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
}

/// A `width` x `height` rectangle centred in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_width_pads_and_saturates() {
        assert_eq!(banner_width("LEVEL 1"), 11);
        assert_eq!(banner_width(""), 4);
        assert_eq!(banner_width(&"x".repeat(65_533)), u16::MAX);
        assert_eq!(banner_width(&"x".repeat(70_000)), u16::MAX);
    }

    #[test]
    fn centered_clips_to_the_area() {
        let area = Rect::new(2, 1, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(7, 4, 10, 4));
        assert_eq!(centered(area, u16::MAX, 3), Rect::new(2, 4, 20, 3));
    }
}
