use crate::geometry::Geometry;
use crate::host::StickyHost;
use crate::options::StickyOptions;
use crate::scroll::{Direction, Listening, ListenerId, ScrollEvent, ScrollListener};
use crate::style::WrapperStyle;

use super::{Positioning, Status};

/// Positioning state machine for one sticky element.
///
/// Elements that fit inside the viewport (between the window offsets) are
/// pinned to the top of the viewport while the container is in view. Taller
/// elements scroll with the page until their leading edge comes into view,
/// then pin to the top (scrolling up) or bottom (scrolling down) of the
/// viewport. Whenever pinning would leave the container the element is put
/// back in absolute position inside it.
pub struct StickyController<H> {
    host: H,
    options: StickyOptions,
    geometry: Geometry,
    status: Status,
    positioning: Positioning,
    /// Top of the wrapper relative to the container at the last absolute placement
    wrapper_top: f64,
    subscription: Option<ListenerId>,
}

impl<H: StickyHost> StickyController<H> {
    /// A detached controller; nothing is measured until [`attach`](Self::attach)
    pub fn new(host: H, options: StickyOptions) -> Self {
        Self {
            host,
            options,
            geometry: Geometry::default(),
            status: Status::Detached,
            positioning: Positioning::Initializing,
            wrapper_top: 0.0,
            subscription: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &StickyOptions {
        &self.options
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn positioning(&self) -> Positioning {
        self.positioning
    }

    pub fn wrapper_top(&self) -> f64 {
        self.wrapper_top
    }

    pub fn is_attached(&self) -> bool {
        self.status != Status::Detached
    }

    pub(super) fn take_subscription(&mut self) -> Option<ListenerId> {
        self.subscription.take()
    }

    pub(super) fn set_subscription(&mut self, id: ListenerId) {
        self.subscription = Some(id);
    }

    /// Start handling scroll input. Returns whether the controller is
    /// attached afterwards; an element with no room to move detaches at once.
    pub fn attach(&mut self) -> bool {
        if self.is_attached() {
            return false;
        }
        self.status = Status::Stopped;
        self.update_info();

        if self.is_attached() {
            log::info!(
                "sticky element attached ({}, fits viewport: {})",
                self.positioning,
                self.geometry.fits_viewport
            );
        }
        self.is_attached()
    }

    /// Give the element back to its original parent. Returns false if
    /// already detached.
    pub fn detach(&mut self) -> bool {
        if !self.is_attached() {
            return false;
        }
        self.host.unwrap();
        self.status = Status::Detached;
        self.positioning = Positioning::Initializing;
        log::info!("sticky element detached");
        true
    }

    /// Re-measure geometry and re-place the element for the current scroll
    /// offset. Detaches when the element no longer has room to move.
    pub fn update_info(&mut self) {
        self.geometry = Geometry::measure(&self.host, &self.options);
        if !self.is_attached() {
            return;
        }

        if !self.geometry.needs_sticking(&self.options) {
            log::info!(
                "element height {} leaves no room in usable container height {}",
                self.geometry.element_height,
                self.geometry.usable_container_height(&self.options)
            );
            self.detach();
            return;
        }

        self.host.wrap(self.geometry.element_size());
        // Measurements changed, so any previous placement is stale
        self.positioning = Positioning::Initializing;
        let offset = self.geometry.clamp_offset(self.host.scroll_offset());
        self.position_absolutely(offset);
    }

    pub fn handle_scroll(&mut self, direction: Direction, offset: f64) {
        if !self.is_attached() {
            return;
        }
        let offset = self.geometry.clamp_offset(offset);

        match direction {
            Direction::Stopped => self.handle_stopped(offset),
            _ if self.geometry.fits_viewport => self.handle_fits_viewport(direction, offset),
            Direction::Up => {
                if self.status == Status::Down {
                    self.position_absolutely(offset);
                }
                self.handle_up(offset);
            }
            Direction::Down => {
                if self.status == Status::Up {
                    self.position_absolutely(offset);
                }
                self.handle_down(offset);
            }
        }
    }

    /// Element shorter than the viewport: pin it to the top while the
    /// container band covers it.
    fn handle_fits_viewport(&mut self, direction: Direction, offset: f64) {
        let geometry = &self.geometry;
        let options = &self.options;
        let scroll_top = offset + options.window_top_offset;
        let scroll_bottom = scroll_top + geometry.element_height;
        let container_bottom = geometry.container_bottom - options.bottom_offset;
        let container_top = geometry.container_top + options.top_offset;

        self.status = direction.into();

        if scroll_bottom >= container_bottom || scroll_top <= container_top {
            self.position_absolutely(offset);
            return;
        }

        if self.positioning != Positioning::Fixed {
            self.fix_to_top();
        }
    }

    fn handle_up(&mut self, offset: f64) {
        let geometry = &self.geometry;
        let options = &self.options;
        let scroll_top = offset - options.top_offset + options.window_top_offset;
        let container_bottom = geometry.container_bottom - geometry.window_height;
        let container_top = geometry.container_top - options.top_offset;

        self.status = Status::Up;

        if scroll_top >= container_bottom || scroll_top <= container_top {
            self.position_absolutely(offset);
            return;
        }

        // Pin once the wrapper's top edge has scrolled into view
        if self.positioning != Positioning::Fixed && scroll_top <= container_top + self.wrapper_top
        {
            self.fix_to_top();
        }
    }

    fn handle_down(&mut self, offset: f64) {
        let geometry = &self.geometry;
        let options = &self.options;
        let scroll_bottom = offset + geometry.window_height;
        let container_bottom = geometry.container_bottom + options.window_bottom_offset;
        let container_top = geometry.container_top + geometry.window_height;

        self.status = Status::Down;

        if scroll_bottom >= container_bottom || scroll_bottom <= container_top {
            self.position_absolutely(offset);
            return;
        }

        // Pin once the wrapper's bottom edge has scrolled into view
        let wrapper_bottom = geometry.container_top
            + self.wrapper_top
            + geometry.element_height
            + options.window_bottom_offset;
        if self.positioning != Positioning::Fixed && scroll_bottom >= wrapper_bottom {
            self.fix_to_bottom();
        }
    }

    fn handle_stopped(&mut self, offset: f64) {
        if self.positioning != Positioning::Absolute {
            self.position_absolutely(offset);
        }
        self.status = Status::Stopped;
    }

    /// Hand the element back to the container at the spot it currently
    /// occupies on screen, kept inside the container band.
    fn position_absolutely(&mut self, offset: f64) {
        if self.positioning == Positioning::Absolute {
            return;
        }

        let geometry = &self.geometry;
        let options = &self.options;
        let max_top = geometry.container_bottom
            - geometry.container_top
            - geometry.element_height
            - options.bottom_offset;

        let mut top = 0.0;
        if self.status == Status::Up || geometry.fits_viewport {
            top = offset + options.window_top_offset - geometry.container_top;
        }
        if self.status == Status::Down && !geometry.fits_viewport {
            top = offset - geometry.container_top + geometry.window_height
                - options.window_bottom_offset
                - geometry.element_height;
        }

        if top < options.top_offset {
            top = options.top_offset;
        }
        if top > max_top {
            top = max_top;
        }

        let style = WrapperStyle::absolute(top, geometry.element_left, &options.absolute_style);
        self.host.apply_style(&style);
        log::debug!(
            "{} -> absolute at {top} (offset {offset}, {})",
            self.positioning,
            self.status
        );
        self.positioning = Positioning::Absolute;
        self.wrapper_top = top;
    }

    fn fix_to_top(&mut self) {
        let style = WrapperStyle::fixed_top(
            self.options.window_top_offset,
            self.geometry.element_fixed_left,
            &self.options.fixed_style,
        );
        self.host.apply_style(&style);
        log::debug!("{} -> fixed to top ({})", self.positioning, self.status);
        self.positioning = Positioning::Fixed;
    }

    fn fix_to_bottom(&mut self) {
        let style = WrapperStyle::fixed_bottom(
            self.options.window_bottom_offset,
            self.geometry.element_fixed_left,
            &self.options.fixed_style,
        );
        self.host.apply_style(&style);
        log::debug!("{} -> fixed to bottom ({})", self.positioning, self.status);
        self.positioning = Positioning::Fixed;
    }
}

impl<H: StickyHost> ScrollListener for StickyController<H> {
    fn on_scroll(&mut self, event: ScrollEvent) -> Listening {
        self.handle_scroll(event.direction, event.offset);
        self.listening()
    }

    fn on_resize(&mut self) -> Listening {
        self.update_info();
        self.listening()
    }
}

impl<H: StickyHost> StickyController<H> {
    fn listening(&self) -> Listening {
        if self.is_attached() {
            Listening::Continue
        } else {
            Listening::Stop
        }
    }
}
