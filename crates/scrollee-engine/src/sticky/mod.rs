//! Sticky element controller.
//!
//! A [`StickyController`] owns a host and runs the positioning state machine;
//! [`Sticky`] is the shared handle that wires a controller to a
//! [`ScrollBroadcaster`].

mod controller;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::geometry::Geometry;
use crate::host::StickyHost;
use crate::options::StickyOptions;
use crate::scroll::{Direction, ScrollBroadcaster};

pub use controller::StickyController;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StickyError {
    #[error("no valid element specified: {0}")]
    MissingElement(String),
    #[error("no valid container specified: {0}")]
    MissingContainer(String),
    #[error("host error: {0}")]
    Host(String),
}

/// Last scroll direction the controller handled, or detached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Detached,
    Stopped,
    Up,
    Down,
}

impl From<Direction> for Status {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Status::Up,
            Direction::Down => Status::Down,
            Direction::Stopped => Status::Stopped,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Detached => "detached",
            Status::Stopped => "stopped",
            Status::Up => "up",
            Status::Down => "down",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    Initializing,
    Absolute,
    Fixed,
}

impl fmt::Display for Positioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Positioning::Initializing => "initializing",
            Positioning::Absolute => "absolute",
            Positioning::Fixed => "fixed",
        };
        f.write_str(name)
    }
}

/// Shared handle to a sticky controller.
///
/// Clones refer to the same controller. The broadcaster holds one reference
/// while the controller is attached.
pub struct Sticky<H: StickyHost + 'static> {
    inner: Rc<RefCell<StickyController<H>>>,
}

impl<H: StickyHost + 'static> Clone for Sticky<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: StickyHost + 'static> Sticky<H> {
    /// Create a controller and attach it right away if `options.auto_attach`
    pub fn new(host: H, options: StickyOptions, broadcaster: &mut ScrollBroadcaster) -> Self {
        let auto_attach = options.auto_attach;
        let sticky = Self {
            inner: Rc::new(RefCell::new(StickyController::new(host, options))),
        };
        if auto_attach {
            sticky.attach(broadcaster);
        }
        sticky
    }

    /// Measure, wrap and subscribe. Returns false if the controller was
    /// already attached or detached itself because there is nothing to stick.
    pub fn attach(&self, broadcaster: &mut ScrollBroadcaster) -> bool {
        let attached = {
            let mut controller = self.inner.borrow_mut();
            if controller.is_attached() {
                return false;
            }
            // Left behind when the controller detached itself mid-dispatch
            if let Some(stale) = controller.take_subscription() {
                broadcaster.unsubscribe(stale);
            }
            controller.attach()
        };

        if attached {
            let id = broadcaster.subscribe(self.inner.clone());
            self.inner.borrow_mut().set_subscription(id);
        }
        attached
    }

    /// Restore the element and stop listening. Returns false if already detached.
    pub fn detach(&self, broadcaster: &mut ScrollBroadcaster) -> bool {
        let mut controller = self.inner.borrow_mut();
        if let Some(id) = controller.take_subscription() {
            broadcaster.unsubscribe(id);
        }
        controller.detach()
    }

    /// Detach when the broadcaster is no longer around, e.g. after the
    /// global service was torn down. The element is still restored; a
    /// broadcaster that outlived the call drops the listener on its next
    /// dispatch.
    pub fn release(&self) -> bool {
        let mut controller = self.inner.borrow_mut();
        controller.take_subscription();
        controller.detach()
    }

    /// Re-measure the page, e.g. after content changed height
    pub fn update_info(&self) {
        self.inner.borrow_mut().update_info();
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().is_attached()
    }

    pub fn status(&self) -> Status {
        self.inner.borrow().status()
    }

    pub fn positioning(&self) -> Positioning {
        self.inner.borrow().positioning()
    }

    pub fn geometry(&self) -> Geometry {
        *self.inner.borrow().geometry()
    }

    pub fn options(&self) -> StickyOptions {
        self.inner.borrow().options().clone()
    }

    pub fn wrapper_top(&self) -> f64 {
        self.inner.borrow().wrapper_top()
    }

    /// Borrow the underlying controller
    pub fn controller(&self) -> Ref<'_, StickyController<H>> {
        self.inner.borrow()
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(self.inner.borrow().host())
    }

    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.inner.borrow_mut().host_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::standard_host;
    use std::time::Duration;

    fn options(auto_attach: bool) -> StickyOptions {
        StickyOptions {
            auto_attach,
            ..StickyOptions::default()
        }
    }

    #[test]
    fn test_auto_attach_subscribes() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(true), &mut broadcaster);

        assert!(sticky.is_attached());
        assert_eq!(sticky.status(), Status::Stopped);
        assert_eq!(sticky.positioning(), Positioning::Absolute);
        assert_eq!(broadcaster.listener_count(), 1);
        assert!(sticky.with_host(|host| host.is_wrapped()));
    }

    #[test]
    fn test_manual_attach() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(false), &mut broadcaster);

        assert!(!sticky.is_attached());
        assert_eq!(broadcaster.listener_count(), 0);

        assert!(sticky.attach(&mut broadcaster));
        assert!(!sticky.attach(&mut broadcaster));
        assert_eq!(broadcaster.listener_count(), 1);
    }

    #[test]
    fn test_detach_unsubscribes_and_unwraps() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(true), &mut broadcaster);

        assert!(sticky.detach(&mut broadcaster));
        assert!(!sticky.detach(&mut broadcaster));

        assert_eq!(sticky.status(), Status::Detached);
        assert_eq!(broadcaster.listener_count(), 0);
        assert!(!sticky.with_host(|host| host.is_wrapped()));

        // Scrolling no longer reaches the controller
        broadcaster.handle_scroll(900.0, Duration::ZERO);
        assert_eq!(sticky.status(), Status::Detached);
    }

    #[test]
    fn test_oversized_element_never_subscribes() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(2000.0), options(true), &mut broadcaster);

        assert!(!sticky.is_attached());
        assert_eq!(broadcaster.listener_count(), 0);
        assert!(!sticky.with_host(|host| host.is_wrapped()));
    }

    #[test]
    fn test_self_detach_on_resize_drops_subscription() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(true), &mut broadcaster);

        // The sidebar grows taller than its container
        sticky.with_host_mut(|host| {
            host.page_mut()
                .boxes
                .get_mut("sidebar")
                .unwrap()
                .rect
                .height = 2100.0;
        });
        broadcaster.handle_resize();

        assert!(!sticky.is_attached());
        assert_eq!(broadcaster.listener_count(), 0);

        // Shrinks again; attaching works and leaves a single subscription
        sticky.with_host_mut(|host| {
            host.page_mut()
                .boxes
                .get_mut("sidebar")
                .unwrap()
                .rect
                .height = 300.0;
        });
        assert!(sticky.attach(&mut broadcaster));
        assert_eq!(broadcaster.listener_count(), 1);
    }

    #[test]
    fn test_update_info_self_detach_is_cleaned_up_on_reattach() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(true), &mut broadcaster);

        sticky.with_host_mut(|host| {
            host.page_mut()
                .boxes
                .get_mut("sidebar")
                .unwrap()
                .rect
                .height = 2100.0;
        });
        sticky.update_info();
        assert!(!sticky.is_attached());
        // Still registered until the next dispatch or attach
        assert_eq!(broadcaster.listener_count(), 1);

        sticky.with_host_mut(|host| {
            host.page_mut()
                .boxes
                .get_mut("sidebar")
                .unwrap()
                .rect
                .height = 400.0;
        });
        assert!(sticky.attach(&mut broadcaster));
        assert_eq!(broadcaster.listener_count(), 1);
    }

    #[test]
    fn test_release_restores_element_without_broadcaster() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(true), &mut broadcaster);
        assert!(sticky.with_host(|host| host.is_wrapped()));
        drop(broadcaster);

        assert!(sticky.release());

        assert!(!sticky.is_attached());
        assert_eq!(sticky.status(), Status::Detached);
        assert!(!sticky.with_host(|host| host.is_wrapped()));
        assert!(!sticky.release());
    }

    #[test]
    fn test_released_listener_is_pruned_by_surviving_broadcaster() {
        let mut broadcaster = ScrollBroadcaster::new();
        let sticky = Sticky::new(standard_host(400.0), options(true), &mut broadcaster);

        assert!(sticky.release());
        assert_eq!(broadcaster.listener_count(), 1);

        broadcaster.handle_scroll(300.0, Duration::ZERO);
        assert_eq!(broadcaster.listener_count(), 0);
        assert!(!sticky.with_host(|host| host.is_wrapped()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StickyError::MissingContainer("main".to_string()).to_string(),
            "no valid container specified: main"
        );
        assert_eq!(
            StickyError::Host("detached node".to_string()).to_string(),
            "host error: detached node"
        );
    }
}
