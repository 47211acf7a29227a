//! Scroll broadcaster.
//!
//! Turns raw vertical scroll offsets into `(direction, offset)` events and
//! fans them out to subscribers. After a quiet period without scroll input a
//! synthetic `Stopped` event is published, followed by a scroll-end event.
//!
//! Time is supplied by the caller as a `Duration` since any fixed origin, so
//! the broadcaster works the same under a terminal event loop and under a
//! browser timer.

pub mod global;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

/// Quiet period after which scrolling is considered finished
pub const DEFAULT_SCROLL_END_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Stopped,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScrollEvent {
    pub direction: Direction,
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEventKind {
    Scroll,
    ScrollEnd,
}

/// Returned by listeners to stay subscribed or drop out after this dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listening {
    Continue,
    Stop,
}

pub trait ScrollListener {
    fn on_scroll(&mut self, event: ScrollEvent) -> Listening;

    fn on_scroll_end(&mut self, _event: ScrollEvent) -> Listening {
        Listening::Continue
    }

    fn on_resize(&mut self) -> Listening {
        Listening::Continue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Adapter so plain closures can listen on a single channel
struct CallbackListener<F> {
    kind: ScrollEventKind,
    callback: F,
}

impl<F: FnMut(ScrollEvent)> ScrollListener for CallbackListener<F> {
    fn on_scroll(&mut self, event: ScrollEvent) -> Listening {
        if self.kind == ScrollEventKind::Scroll {
            (self.callback)(event);
        }
        Listening::Continue
    }

    fn on_scroll_end(&mut self, event: ScrollEvent) -> Listening {
        if self.kind == ScrollEventKind::ScrollEnd {
            (self.callback)(event);
        }
        Listening::Continue
    }
}

struct Subscriber {
    id: ListenerId,
    listener: Rc<RefCell<dyn ScrollListener>>,
}

#[derive(Clone, Copy)]
enum Dispatch {
    Scroll(ScrollEvent),
    ScrollEnd(ScrollEvent),
    Resize,
}

pub struct ScrollBroadcaster {
    enabled: bool,
    last_offset: f64,
    status: Direction,
    scroll_end_delay: Duration,
    scroll_end_deadline: Option<Duration>,
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl Default for ScrollBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScrollBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBroadcaster")
            .field("enabled", &self.enabled)
            .field("last_offset", &self.last_offset)
            .field("status", &self.status)
            .field("scroll_end_delay", &self.scroll_end_delay)
            .field("scroll_end_deadline", &self.scroll_end_deadline)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ScrollBroadcaster {
    /// A new broadcaster starts enabled, at offset 0, stopped.
    pub fn new() -> Self {
        Self::with_scroll_end_delay(DEFAULT_SCROLL_END_DELAY)
    }

    pub fn with_scroll_end_delay(delay: Duration) -> Self {
        Self {
            enabled: true,
            last_offset: 0.0,
            status: Direction::Stopped,
            scroll_end_delay: delay,
            scroll_end_deadline: None,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn set_scroll_end_delay(&mut self, delay: Duration) -> &mut Self {
        self.scroll_end_delay = delay;
        self
    }

    pub fn scroll_end_delay(&self) -> Duration {
        self.scroll_end_delay
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            log::debug!("scroll broadcaster enabled");
        }
        self.enabled = true;
    }

    /// Stop reacting to input. A pending scroll end is dropped.
    pub fn disable(&mut self) {
        if self.enabled {
            log::debug!("scroll broadcaster disabled");
        }
        self.enabled = false;
        self.scroll_end_deadline = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current direction, `Stopped` once the quiet period has elapsed
    pub fn status(&self) -> Direction {
        self.status
    }

    /// Last offset seen by `handle_scroll`
    pub fn offset(&self) -> f64 {
        self.last_offset
    }

    pub fn scroll_end_deadline(&self) -> Option<Duration> {
        self.scroll_end_deadline
    }

    pub fn subscribe(&mut self, listener: Rc<RefCell<dyn ScrollListener>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, listener });
        id
    }

    /// Subscribe a closure to one channel
    pub fn on<F>(&mut self, kind: ScrollEventKind, callback: F) -> ListenerId
    where
        F: FnMut(ScrollEvent) + 'static,
    {
        self.subscribe(Rc::new(RefCell::new(CallbackListener { kind, callback })))
    }

    /// Returns whether the listener was subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        self.subscribers.len() != before
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.subscribers.iter().any(|subscriber| subscriber.id == id)
    }

    pub fn listener_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Feed a new scroll offset observed at `now`.
    ///
    /// An unchanged offset keeps the previous direction.
    pub fn handle_scroll(&mut self, offset: f64, now: Duration) {
        if !self.enabled {
            return;
        }

        let status = if offset < self.last_offset {
            Direction::Up
        } else if offset > self.last_offset {
            Direction::Down
        } else {
            self.status
        };
        if status != self.status {
            log::debug!("scroll direction {} -> {status} at {offset}", self.status);
        }
        self.status = status;

        self.dispatch(Dispatch::Scroll(ScrollEvent {
            direction: status,
            offset,
        }));

        self.scroll_end_deadline = Some(now + self.scroll_end_delay);
        self.last_offset = offset;
    }

    /// Fire the scroll end if the quiet period has elapsed by `now`.
    ///
    /// Returns whether a scroll end was published.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.scroll_end_deadline {
            Some(deadline) if self.enabled && now >= deadline => {
                self.end_scroll();
                true
            }
            _ => false,
        }
    }

    /// Publish `Stopped` on the scroll channel, then on the scroll-end channel
    pub fn end_scroll(&mut self) {
        if !self.enabled {
            return;
        }

        self.scroll_end_deadline = None;
        self.status = Direction::Stopped;
        let event = ScrollEvent {
            direction: Direction::Stopped,
            offset: self.last_offset,
        };
        log::debug!("scroll ended at {}", event.offset);

        self.dispatch(Dispatch::Scroll(event));
        self.dispatch(Dispatch::ScrollEnd(event));
    }

    /// Tell subscribers the viewport changed and they should re-measure.
    ///
    /// Resizes are forwarded even while disabled; only scroll input is gated.
    pub fn handle_resize(&mut self) {
        self.dispatch(Dispatch::Resize);
    }

    fn dispatch(&mut self, dispatch: Dispatch) {
        self.subscribers.retain(|subscriber| {
            let Ok(mut listener) = subscriber.listener.try_borrow_mut() else {
                log::warn!(
                    "skipping listener {:?}: already borrowed during dispatch",
                    subscriber.id
                );
                return true;
            };
            let listening = match dispatch {
                Dispatch::Scroll(event) => listener.on_scroll(event),
                Dispatch::ScrollEnd(event) => listener.on_scroll_end(event),
                Dispatch::Resize => listener.on_resize(),
            };
            listening == Listening::Continue
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn recording(
        broadcaster: &mut ScrollBroadcaster,
        kind: ScrollEventKind,
    ) -> Rc<RefCell<Vec<ScrollEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        broadcaster.on(kind, move |event| sink.borrow_mut().push(event));
        events
    }

    fn event(direction: Direction, offset: f64) -> ScrollEvent {
        ScrollEvent { direction, offset }
    }

    #[test]
    fn test_direction_follows_offset_changes() {
        let mut broadcaster = ScrollBroadcaster::new();
        let events = recording(&mut broadcaster, ScrollEventKind::Scroll);

        broadcaster.handle_scroll(100.0, ms(0));
        broadcaster.handle_scroll(150.0, ms(16));
        broadcaster.handle_scroll(120.0, ms(32));

        assert_eq!(
            *events.borrow(),
            vec![
                event(Direction::Down, 100.0),
                event(Direction::Down, 150.0),
                event(Direction::Up, 120.0),
            ]
        );
        assert_eq!(broadcaster.status(), Direction::Up);
        assert_eq!(broadcaster.offset(), 120.0);
    }

    #[test]
    fn test_unchanged_offset_keeps_previous_direction() {
        let mut broadcaster = ScrollBroadcaster::new();
        let events = recording(&mut broadcaster, ScrollEventKind::Scroll);

        broadcaster.handle_scroll(0.0, ms(0));
        broadcaster.handle_scroll(80.0, ms(10));
        broadcaster.handle_scroll(80.0, ms(20));

        assert_eq!(
            *events.borrow(),
            vec![
                event(Direction::Stopped, 0.0),
                event(Direction::Down, 80.0),
                event(Direction::Down, 80.0),
            ]
        );
    }

    #[test]
    fn test_poll_fires_stopped_after_quiet_period() {
        let mut broadcaster = ScrollBroadcaster::new();
        let scroll = recording(&mut broadcaster, ScrollEventKind::Scroll);
        let ends = recording(&mut broadcaster, ScrollEventKind::ScrollEnd);

        broadcaster.handle_scroll(300.0, ms(1000));
        assert_eq!(broadcaster.scroll_end_deadline(), Some(ms(1200)));

        assert!(!broadcaster.poll(ms(1199)));
        assert!(ends.borrow().is_empty());

        assert!(broadcaster.poll(ms(1200)));
        assert_eq!(broadcaster.status(), Direction::Stopped);
        assert_eq!(broadcaster.scroll_end_deadline(), None);
        assert_eq!(
            scroll.borrow().last().copied(),
            Some(event(Direction::Stopped, 300.0))
        );
        assert_eq!(*ends.borrow(), vec![event(Direction::Stopped, 300.0)]);

        // Nothing pending any more
        assert!(!broadcaster.poll(ms(5000)));
    }

    #[test]
    fn test_new_scroll_pushes_deadline_back() {
        let mut broadcaster = ScrollBroadcaster::with_scroll_end_delay(ms(50));

        broadcaster.handle_scroll(10.0, ms(0));
        broadcaster.handle_scroll(20.0, ms(40));

        assert!(!broadcaster.poll(ms(60)));
        assert!(broadcaster.poll(ms(90)));
    }

    #[test]
    fn test_set_scroll_end_delay() {
        let mut broadcaster = ScrollBroadcaster::new();
        broadcaster.set_scroll_end_delay(ms(500));

        broadcaster.handle_scroll(10.0, ms(100));

        assert_eq!(broadcaster.scroll_end_delay(), ms(500));
        assert_eq!(broadcaster.scroll_end_deadline(), Some(ms(600)));
    }

    #[test]
    fn test_disabled_broadcaster_ignores_input() {
        let mut broadcaster = ScrollBroadcaster::new();
        let events = recording(&mut broadcaster, ScrollEventKind::Scroll);

        broadcaster.handle_scroll(100.0, ms(0));
        broadcaster.disable();
        broadcaster.handle_scroll(500.0, ms(10));
        assert!(!broadcaster.poll(ms(1000)));

        assert_eq!(events.borrow().len(), 1);
        assert_eq!(broadcaster.offset(), 100.0);

        broadcaster.enable();
        broadcaster.handle_scroll(50.0, ms(2000));
        assert_eq!(
            events.borrow().last().copied(),
            Some(event(Direction::Up, 50.0))
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut broadcaster = ScrollBroadcaster::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let id = broadcaster.on(ScrollEventKind::Scroll, move |event| {
            sink.borrow_mut().push(event)
        });

        assert!(broadcaster.is_subscribed(id));
        assert!(broadcaster.unsubscribe(id));
        assert!(!broadcaster.unsubscribe(id));
        assert_eq!(broadcaster.listener_count(), 0);

        broadcaster.handle_scroll(10.0, ms(0));
        assert!(events.borrow().is_empty());
    }

    struct StopAfter {
        remaining: usize,
        resizes: usize,
    }

    impl ScrollListener for StopAfter {
        fn on_scroll(&mut self, _event: ScrollEvent) -> Listening {
            self.remaining -= 1;
            if self.remaining == 0 {
                Listening::Stop
            } else {
                Listening::Continue
            }
        }

        fn on_resize(&mut self) -> Listening {
            self.resizes += 1;
            Listening::Continue
        }
    }

    #[test]
    fn test_listener_stop_removes_subscription() {
        let mut broadcaster = ScrollBroadcaster::new();
        let listener = Rc::new(RefCell::new(StopAfter {
            remaining: 2,
            resizes: 0,
        }));
        let id = broadcaster.subscribe(listener.clone());

        broadcaster.handle_resize();
        broadcaster.handle_scroll(10.0, ms(0));
        assert!(broadcaster.is_subscribed(id));

        broadcaster.handle_scroll(20.0, ms(10));
        assert!(!broadcaster.is_subscribed(id));

        broadcaster.handle_resize();
        assert_eq!(listener.borrow().resizes, 1);
    }

    #[test]
    fn test_resize_reaches_listeners_while_disabled() {
        let mut broadcaster = ScrollBroadcaster::new();
        let listener = Rc::new(RefCell::new(StopAfter {
            remaining: 5,
            resizes: 0,
        }));
        broadcaster.subscribe(listener.clone());

        broadcaster.disable();
        broadcaster.handle_resize();
        broadcaster.handle_scroll(10.0, ms(0));

        assert_eq!(listener.borrow().resizes, 1);
        assert_eq!(listener.borrow().remaining, 5);
    }

    #[test]
    fn test_borrowed_listener_is_skipped_not_dropped() {
        let mut broadcaster = ScrollBroadcaster::new();
        let listener = Rc::new(RefCell::new(StopAfter {
            remaining: 5,
            resizes: 0,
        }));
        let id = broadcaster.subscribe(listener.clone());

        {
            let _held = listener.borrow_mut();
            broadcaster.handle_scroll(10.0, ms(0));
        }

        assert!(broadcaster.is_subscribed(id));
        assert_eq!(listener.borrow().remaining, 5);
    }
}
