use anyhow::{Result, bail};
use scrollee_config::Config;
use scrollee_engine::host::{PageHost, SimulatedPage};
use scrollee_engine::{
    Direction, Positioning, Rect, ScrollBroadcaster, ScrollEventKind, Size, Status, Sticky,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

// The simulated page is laid out in terminal cells: one unit is one row/column.
pub const HEADER_ROWS: f64 = 8.0;
pub const ARTICLE_ROWS: f64 = 200.0;
pub const DOCUMENT_ROWS: f64 = 240.0;
pub const RAIL_LEFT: f64 = 64.0;
pub const RAIL_WIDTH: f64 = 26.0;

const EVENT_LOG_LEN: usize = 8;

/// A header, a long article with a table-of-contents rail, and a footer
pub fn demo_page(viewport: Size, sidebar_rows: f64) -> SimulatedPage {
    SimulatedPage::new(viewport, DOCUMENT_ROWS)
        .with_box(
            "article",
            Rect::new(HEADER_ROWS, 0.0, RAIL_LEFT + RAIL_WIDTH, ARTICLE_ROWS),
            None,
        )
        .with_box(
            "rail",
            Rect::new(HEADER_ROWS, RAIL_LEFT, RAIL_WIDTH, ARTICLE_ROWS),
            Some("article"),
        )
        .with_box(
            "toc",
            Rect::new(HEADER_ROWS + 2.0, RAIL_LEFT, RAIL_WIDTH, sidebar_rows),
            Some("rail"),
        )
}

/// Sidebar heights must be positive and finite
pub fn check_sidebar_rows(rows: f64) -> Result<f64> {
    if !rows.is_finite() || rows <= 0.0 {
        bail!("sidebar rows must be a positive number, got {rows}");
    }
    Ok(rows)
}

/// One step of a scripted scroll
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub offset: f64,
    pub direction: Direction,
    pub status: Status,
    pub positioning: Positioning,
    pub css: Option<String>,
}

pub struct App {
    sticky: Sticky<PageHost>,
    broadcaster: ScrollBroadcaster,
    events: Rc<RefCell<VecDeque<String>>>,
}

impl App {
    pub fn new(viewport: Size, sidebar_rows: f64, config: &Config) -> Result<Self> {
        let sidebar_rows = check_sidebar_rows(sidebar_rows)?;
        let host = PageHost::new(demo_page(viewport, sidebar_rows), "toc", "article")?;
        let mut broadcaster = ScrollBroadcaster::with_scroll_end_delay(config.scroll_end_delay());

        let events = Rc::new(RefCell::new(VecDeque::new()));
        for kind in [ScrollEventKind::Scroll, ScrollEventKind::ScrollEnd] {
            let sink = events.clone();
            broadcaster.on(kind, move |event| {
                let mut log = sink.borrow_mut();
                if log.len() == EVENT_LOG_LEN {
                    log.pop_front();
                }
                let label = match kind {
                    ScrollEventKind::Scroll => "scroll",
                    ScrollEventKind::ScrollEnd => "scroll end",
                };
                log.push_back(format!("{label}: {} @ {}", event.direction, event.offset));
            });
        }

        let sticky = Sticky::new(host, config.sticky.clone(), &mut broadcaster);
        if !sticky.is_attached() {
            log::warn!("sidebar of {sidebar_rows} rows has no room to move; left in place");
        }

        Ok(Self {
            sticky,
            broadcaster,
            events,
        })
    }

    pub fn sticky(&self) -> &Sticky<PageHost> {
        &self.sticky
    }

    pub fn broadcaster(&self) -> &ScrollBroadcaster {
        &self.broadcaster
    }

    pub fn recent_events(&self) -> Vec<String> {
        self.events.borrow().iter().cloned().collect()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.sticky.with_host(|host| host.page().scroll_offset)
    }

    pub fn scroll_by(&mut self, delta: f64, now: Duration) {
        let offset = self
            .sticky
            .with_host_mut(|host| host.page_mut().scroll_by(delta));
        self.broadcaster.handle_scroll(offset, now);
    }

    pub fn scroll_to(&mut self, offset: f64, now: Duration) {
        self.sticky
            .with_host_mut(|host| host.page_mut().scroll_to(offset));
        self.broadcaster.handle_scroll(offset, now);
    }

    /// Let the broadcaster publish a pending scroll end
    pub fn tick(&mut self, now: Duration) -> bool {
        self.broadcaster.poll(now)
    }

    pub fn resize(&mut self, viewport: Size) {
        self.sticky.with_host_mut(|host| {
            let page = host.page_mut();
            page.viewport = viewport;
            page.scroll_offset = page.scroll_offset.min(page.max_scroll());
        });
        self.broadcaster.handle_resize();
    }

    pub fn toggle_attached(&mut self) -> bool {
        if self.sticky.is_attached() {
            self.sticky.detach(&mut self.broadcaster);
        } else {
            self.sticky.attach(&mut self.broadcaster);
        }
        self.sticky.is_attached()
    }

    fn trace_row(&self, offset: f64) -> TraceRow {
        TraceRow {
            offset,
            direction: self.broadcaster.status(),
            status: self.sticky.status(),
            positioning: self.sticky.positioning(),
            css: self
                .sticky
                .with_host(|host| host.wrapper_style().map(|style| style.to_css())),
        }
    }

    /// Feed `offsets` one frame apart, then let the scroll settle
    pub fn trace(&mut self, offsets: &[f64]) -> Vec<TraceRow> {
        const FRAME: Duration = Duration::from_millis(16);

        let mut now = Duration::ZERO;
        let mut rows = Vec::with_capacity(offsets.len() + 1);
        for &offset in offsets {
            self.scroll_to(offset, now);
            rows.push(self.trace_row(offset));
            now += FRAME;
        }

        if self.tick(now + self.broadcaster.scroll_end_delay()) {
            rows.push(self.trace_row(self.broadcaster.offset()));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app(sidebar_rows: f64) -> App {
        App::new(Size::new(100.0, 30.0), sidebar_rows, &Config::default()).unwrap()
    }

    #[test]
    fn test_trace_short_sidebar() {
        let mut app = app(12.0);

        let rows = app.trace(&[0.0, 5.0, 20.0, 100.0, 199.0, 210.0]);

        let summary: Vec<_> = rows
            .iter()
            .map(|row| (row.direction, row.positioning))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Direction::Stopped, Positioning::Absolute),
                (Direction::Down, Positioning::Absolute),
                (Direction::Down, Positioning::Fixed),
                (Direction::Down, Positioning::Fixed),
                (Direction::Down, Positioning::Absolute),
                (Direction::Down, Positioning::Absolute),
                (Direction::Stopped, Positioning::Absolute),
            ]
        );
        assert_eq!(
            rows[2].css.as_deref(),
            Some("position: fixed; top: 0px; bottom: auto; left: 64px;")
        );
        // Held at the article bottom: 200 - 12
        assert_eq!(
            rows[4].css.as_deref(),
            Some("position: absolute; top: 188px; bottom: auto; left: 64px;")
        );
        assert_eq!(rows.last().unwrap().status, Status::Stopped);
    }

    #[test]
    fn test_sidebar_taller_than_article_stays_detached() {
        let app = app(ARTICLE_ROWS);

        assert!(!app.sticky().is_attached());
        assert_eq!(app.broadcaster().listener_count(), 2);
    }

    #[test]
    fn test_rejects_unusable_sidebar_rows() {
        for rows in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = App::new(Size::new(100.0, 30.0), rows, &Config::default())
                .err()
                .unwrap();
            assert!(err.to_string().starts_with("sidebar rows must be a positive number"));
        }
    }

    #[test]
    fn test_scroll_by_is_clamped_to_page() {
        let mut app = app(12.0);

        app.scroll_by(-10.0, Duration::ZERO);
        assert_eq!(app.scroll_offset(), 0.0);

        app.scroll_by(500.0, Duration::from_millis(16));
        assert_eq!(app.scroll_offset(), 210.0);
        assert_eq!(app.broadcaster().status(), Direction::Down);
    }

    #[test]
    fn test_tick_settles_and_logs() {
        let mut app = app(12.0);
        app.scroll_by(40.0, Duration::ZERO);
        assert_eq!(app.sticky().positioning(), Positioning::Fixed);

        assert!(!app.tick(Duration::from_millis(100)));
        assert!(app.tick(Duration::from_millis(200)));

        assert_eq!(app.sticky().positioning(), Positioning::Absolute);
        assert_eq!(
            app.recent_events(),
            vec![
                "scroll: down @ 40".to_string(),
                "scroll: stopped @ 40".to_string(),
                "scroll end: stopped @ 40".to_string(),
            ]
        );
    }

    #[test]
    fn test_resize_keeps_offset_in_range() {
        let mut app = app(12.0);
        app.scroll_to(210.0, Duration::ZERO);

        app.resize(Size::new(100.0, 60.0));

        assert_eq!(app.scroll_offset(), 180.0);
        assert_eq!(app.sticky().geometry().window_height, 60.0);
    }

    #[test]
    fn test_toggle_attached() {
        let mut app = app(12.0);
        assert!(!app.toggle_attached());
        assert!(!app.sticky().with_host(|host| host.is_wrapped()));
        assert!(app.toggle_attached());
    }
}
