//! Layout and drawing: board, sidebar, start/pause/game-over overlays.

use crate::game::{Game, Phase};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each board cell is two terminal columns so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;
/// Fade of the board into the background when the game ends.
const GAME_OVER_FADE_MS: u32 = 600;

/// Game-over fade, kept across frames by the presenter.
#[derive(Default)]
pub struct FadeState {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl FadeState {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    fn finished(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }

    /// Fade started but not done; the scheduler keeps drawing until it settles.
    pub fn animating(&self) -> bool {
        self.effect.as_ref().is_some_and(|e| !e.done())
    }
}

/// Board size in terminal cells, border included.
fn board_outer_size(game: &Game) -> (u16, u16) {
    let grid = game.grid();
    (
        (grid.cols() as u16).saturating_mul(CELL_WIDTH).saturating_add(2),
        (grid.rows() as u16).saturating_add(2),
    )
}

/// Draw the whole screen for the current phase.
pub fn draw(frame: &mut Frame, game: &Game, theme: &Theme, fade: &mut FadeState, now: Instant) {
    let area = frame.area();
    let (bw, bh) = board_outer_size(game);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bw),
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = |r: Rect| {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(bh),
                Constraint::Fill(1),
            ])
            .split(r)[1]
    };
    let board_area = vert(horiz[1]);
    let sidebar_area = vert(horiz[2]);

    if game.phase() != Phase::GameOver {
        fade.reset();
    }
    let dimmed = fade.finished();

    let inner = draw_board(frame, game, theme, board_area, dimmed);
    draw_sidebar(frame, game, theme, sidebar_area);

    match game.phase() {
        Phase::NotStarted => draw_message(
            frame,
            theme,
            inner,
            " Blockfall ",
            Style::default().fg(Color::Black).bg(theme.title),
            " Enter — Start ",
        ),
        Phase::Paused => draw_message(
            frame,
            theme,
            inner,
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
            " P — Resume ",
        ),
        Phase::GameOver => {
            if !dimmed {
                apply_game_over_fade(frame, theme, inner, fade, now);
            }
            draw_message(
                frame,
                theme,
                inner,
                " Game Over ",
                Style::default().fg(Color::White).bg(Color::Red),
                " R — Restart ",
            );
        }
        Phase::Running => {}
    }
}

/// Colour of the active piece if it covers this board cell.
fn piece_color_at(game: &Game, x: usize, y: usize) -> Option<u8> {
    let piece = game.piece()?;
    piece
        .filled_cells()
        .any(|(px, py)| px == x as i32 && py == y as i32)
        .then_some(piece.color)
}

/// Board with border and score title. Returns the inner (cell) area.
fn draw_board(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect, dimmed: bool) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" Score: {} ", game.score()),
            Style::default().fg(theme.title),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let buf = frame.buffer_mut();
    for (y, row) in game.grid().iter_rows().enumerate() {
        for (x, &settled) in row.iter().enumerate() {
            let id = piece_color_at(game, x, y).unwrap_or(settled);
            let color = match theme.block_color(id) {
                Some(_) if dimmed => Some(theme.inactive_fg),
                c => c,
            };
            let symbol = if color.is_some() { "█" } else { " " };
            let style = Style::default()
                .fg(color.unwrap_or(theme.bg))
                .bg(theme.bg);
            // Widened to u32: oversized boards are clipped, not wrapped.
            let ry = u32::from(inner.y) + y as u32;
            for dx in 0..CELL_WIDTH {
                let rx = u32::from(inner.x) + x as u32 * u32::from(CELL_WIDTH) + u32::from(dx);
                if rx < u32::from(inner.right()) && ry < u32::from(inner.bottom()) {
                    buf[(rx as u16, ry as u16)].set_symbol(symbol).set_style(style);
                }
            }
        }
    }
    inner
}

fn draw_sidebar(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let hint_style = Style::default().fg(theme.inactive_fg);
    let state = match game.phase() {
        Phase::NotStarted => "Ready",
        Phase::Running => "Playing",
        Phase::Paused => "Paused",
        Phase::GameOver => "Game over",
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(game.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(game.lines_cleared().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("State: ", title_style),
            Span::styled(state, fg_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("←/→  move", hint_style)),
        Line::from(Span::styled("↑    rotate", hint_style)),
        Line::from(Span::styled("↓    soft drop", hint_style)),
        Line::from(Span::styled("P    pause", hint_style)),
        Line::from(Span::styled("R    restart", hint_style)),
        Line::from(Span::styled("Q    quit", hint_style)),
    ];
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    frame.render_widget(p, area);
}

/// Centred popup with a highlighted title and one hint line.
fn draw_message(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    title: &str,
    title_style: Style,
    hint: &str,
) {
    let popup_w = 18u16;
    let popup_h = 5u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let lines = vec![
        Line::from(Span::styled(
            title,
            title_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(theme.main_fg))),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        );
    frame.render_widget(p, popup);
}

/// Create or advance the game-over fade (TachyonFX: board cells fade to the background).
fn apply_game_over_fade(
    frame: &mut Frame,
    theme: &Theme,
    board_rect: Rect,
    fade: &mut FadeState,
    now: Instant,
) {
    let delta = fade
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    fade.last_process = Some(now);

    if fade.effect.is_none() {
        let effect = fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board_rect);
        fade.effect = Some(effect);
    }

    if let Some(effect) = &mut fade.effect {
        frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
    }
}
