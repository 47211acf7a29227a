use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use scrollee_engine::Positioning;

use crate::app::{App, ARTICLE_ROWS, DOCUMENT_ROWS, HEADER_ROWS, RAIL_LEFT, RAIL_WIDTH};

/// Height of the status panel under the page viewport
pub const STATUS_ROWS: u16 = 6;

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(STATUS_ROWS)].as_ref())
        .split(f.area());

    render_page(f, app, chunks[0]);
    render_sidebar(f, app, chunks[0]);
    render_status(f, app, chunks[1]);
}

fn page_line(row: usize) -> Line<'static> {
    let row_f = row as f64;
    let article_bottom = HEADER_ROWS + ARTICLE_ROWS;

    if row_f < HEADER_ROWS {
        let text = if row == HEADER_ROWS as usize / 2 {
            "  scrollee demo"
        } else {
            ""
        };
        return Line::from(Span::styled(
            format!("{text:<width$}", width = (RAIL_LEFT + RAIL_WIDTH) as usize),
            Style::default().bg(Color::Blue).fg(Color::White),
        ));
    }
    if row_f >= article_bottom {
        let text = if row == article_bottom as usize {
            "── footer ──"
        } else {
            ""
        };
        return Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)));
    }

    let article_row = row - HEADER_ROWS as usize;
    if article_row % 12 == 0 {
        Line::from(Span::styled(
            format!("§ Section {}", article_row / 12 + 1),
            Style::default().add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(format!(
            "{row:>4} │ Lorem ipsum dolor sit amet, consectetur adipiscing elit."
        ))
    }
}

fn render_page(f: &mut Frame, app: &App, area: Rect) {
    let offset = app.scroll_offset().max(0.0) as usize;
    let last = (offset + area.height as usize).min(DOCUMENT_ROWS as usize);
    let lines: Vec<Line> = (offset..last).map(page_line).collect();

    f.render_widget(Paragraph::new(lines), area);
}

/// Sidebar rows `first..first + count`; row 0 is the heading
fn sidebar_lines(first: i64, count: i64) -> Vec<Line<'static>> {
    (first..first + count)
        .map(|row| {
            if row == 0 {
                Line::from(Span::styled(
                    " On this page",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  · Section {row}"))
            }
        })
        .collect()
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let (top, height) = app.sticky().with_host(|host| {
        let height = host
            .wrapper_size()
            .map(|size| size.height)
            .unwrap_or_else(|| host.page().box_rect("toc").unwrap_or_default().height);
        (host.element_viewport_top(), height)
    });

    let top = top.round() as i64;
    let height = height as i64;
    let visible_top = top.max(0);
    let visible_bottom = (top + height).min(area.height as i64);
    if visible_bottom <= visible_top {
        return;
    }

    let x = area.x + RAIL_LEFT as u16;
    let width = (RAIL_WIDTH as u16).min(area.width.saturating_sub(RAIL_LEFT as u16));
    if width == 0 {
        return;
    }
    let rect = Rect::new(
        x,
        area.y + visible_top as u16,
        width,
        (visible_bottom - visible_top) as u16,
    );

    let color = match app.sticky().positioning() {
        Positioning::Fixed => Color::Yellow,
        Positioning::Absolute => Color::Cyan,
        Positioning::Initializing => Color::Gray,
    };
    let sidebar = Paragraph::new(sidebar_lines(visible_top - top, visible_bottom - visible_top))
        .style(Style::default().bg(Color::DarkGray).fg(color));

    f.render_widget(Clear, rect);
    f.render_widget(sidebar, rect);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let sticky = app.sticky();
    let css = sticky
        .with_host(|host| host.wrapper_style().map(|style| style.to_css()))
        .unwrap_or_else(|| "(not wrapped)".to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("offset {:>5} | ", app.scroll_offset())),
            Span::raw(format!("scroll {:<7} | ", app.broadcaster().status().to_string())),
            Span::raw(format!("sticky {:<8} | ", sticky.status().to_string())),
            Span::styled(
                sticky.positioning().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(css),
    ];
    lines.extend(
        app.recent_events()
            .into_iter()
            .rev()
            .take(2)
            .map(|event| Line::from(Span::styled(event, Style::default().fg(Color::DarkGray)))),
    );
    lines.push(Line::from(
        "q: Quit | ↑/k ↓/j: Scroll | PgUp/PgDn: Page | g/G: Top/Bottom | a: Attach/Detach",
    ));

    let status = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}
