//! Process-wide broadcaster for hosts that have a single scrolling window.
//!
//! The service lives in thread-local storage and must be brought up with
//! [`init`] and released with [`teardown`]. Listeners are dispatched while the
//! service is borrowed, so a listener must not call [`with`] itself.

use std::cell::RefCell;
use std::time::Duration;

use super::ScrollBroadcaster;

thread_local! {
    static BROADCASTER: RefCell<Option<ScrollBroadcaster>> = const { RefCell::new(None) };
}

/// Start the service. Returns false if it was already running, in which case
/// the existing broadcaster and its subscribers are kept.
pub fn init(scroll_end_delay: Duration) -> bool {
    BROADCASTER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_some() {
            return false;
        }
        log::debug!("global scroll broadcaster initialised");
        *slot = Some(ScrollBroadcaster::with_scroll_end_delay(scroll_end_delay));
        true
    })
}

/// Drop the service and every subscriber it holds
pub fn teardown() -> Option<ScrollBroadcaster> {
    BROADCASTER.with(|cell| {
        let previous = cell.borrow_mut().take();
        if previous.is_some() {
            log::debug!("global scroll broadcaster torn down");
        }
        previous
    })
}

pub fn is_initialized() -> bool {
    BROADCASTER.with(|cell| cell.borrow().is_some())
}

/// Run `f` against the service; `None` when it has not been initialised
pub fn with<R>(f: impl FnOnce(&mut ScrollBroadcaster) -> R) -> Option<R> {
    BROADCASTER.with(|cell| cell.borrow_mut().as_mut().map(f))
}
