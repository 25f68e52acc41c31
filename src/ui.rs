use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::audio::AudioSink;
use crate::board::{CellId, CELL_COUNT, GRID_SIDE};
use crate::runtime::Scheduler;
use crate::sinks::BoardView;

const HORIZONTAL_MARGIN: u16 = 2;
const MAX_CELL_WIDTH: u16 = 16;
const MAX_CELL_HEIGHT: u16 = 7;
const ENEMY: &str = "(o_o)";

struct Regions {
    hud: Rect,
    grid: Rect,
    footer: Rect,
}

fn regions(area: Rect) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // hud
            Constraint::Length(1), // padding
            Constraint::Min(3),    // grid
            Constraint::Length(1), // footer
        ])
        .split(area);

    Regions {
        hud: chunks[0],
        grid: chunks[2],
        footer: chunks[3],
    }
}

/// Screen rectangles of the nine cells for a frame of size `area`, row-major.
/// Rendering and mouse hit-testing both go through here.
pub fn cell_rects(area: Rect) -> [Rect; CELL_COUNT] {
    let grid = regions(area).grid;
    let side = GRID_SIDE as u16;
    let cell_w = (grid.width / side).min(MAX_CELL_WIDTH);
    let cell_h = (grid.height / side).min(MAX_CELL_HEIGHT);
    let left = grid.x + (grid.width - cell_w * side) / 2;
    let top = grid.y + (grid.height - cell_h * side) / 2;

    let mut rects = [Rect::default(); CELL_COUNT];
    for cell in CellId::all() {
        rects[cell.index()] = Rect::new(
            left + cell.col() as u16 * cell_w,
            top + cell.row() as u16 * cell_h,
            cell_w,
            cell_h,
        );
    }
    rects
}

/// Cell under the terminal position (`column`, `row`), if any
pub fn cell_at(area: Rect, column: u16, row: u16) -> Option<CellId> {
    cell_rects(area)
        .iter()
        .position(|r| {
            column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
        })
        .and_then(CellId::from_index)
}

fn render_hud(view: &BoardView, area: Rect, buf: &mut Buffer) {
    let label = Style::default().add_modifier(Modifier::DIM);
    let value = Style::default().add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled("score ", label),
        Span::styled(view.score.as_str(), value.fg(Color::Green)),
        Span::raw("   "),
        Span::styled("time ", label),
        Span::styled(view.time_left.as_str(), value.fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("lives ", label),
        Span::styled(view.lives.as_str(), value.fg(Color::Red)),
    ]);

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_grid(view: &BoardView, area: Rect, buf: &mut Buffer) {
    let rects = cell_rects(area);

    for cell in CellId::all() {
        let rect = rects[cell.index()];
        if rect.width < 2 || rect.height < 2 {
            continue;
        }
        let active = view.is_active(cell);

        let border_style = if active {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Span::styled(cell.to_string(), Style::default().add_modifier(Modifier::DIM)));

        let inner = block.inner(rect);
        block.render(rect, buf);

        if active && inner.height > 0 {
            let mid = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
            Paragraph::new(Span::styled(
                ENEMY,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(mid, buf);
        }
    }
}

fn render_footer(state: &AppState, area: Rect, buf: &mut Buffer) {
    let hint = match state {
        AppState::Playing => "click the target before it moves | (esc)ape",
        AppState::Notice(_) => "press any key",
        AppState::Over => "(r)estart (esc)ape",
    };
    Paragraph::new(Span::styled(
        hint,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_notice(message: &str, area: Rect, buf: &mut Buffer) {
    let width = (message.width() as u16 + 6).min(area.width);
    let height = 5u16.min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            message,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .title(" whackr "),
    )
    .render(popup, buf);
}

impl<A: AudioSink, S: Scheduler> Widget for &App<A, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.session.view();
        let r = regions(area);

        render_hud(view, r.hud, buf);
        render_grid(view, area, buf);
        render_footer(&self.state, r.footer, buf);

        if let AppState::Notice(message) = &self.state {
            render_notice(message, area, buf);
        }
    }
}
