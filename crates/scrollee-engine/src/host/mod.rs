pub mod simulated;

use crate::geometry::{Rect, Size};
use crate::style::WrapperStyle;

pub use simulated::{PageBox, PageHost, SimulatedPage};

/// The page a sticky element lives in.
///
/// Measurements come in through this trait and the computed wrapper style
/// goes out through it. A browser implementation reads the DOM; tests and the
/// terminal simulator use [`SimulatedPage`].
pub trait StickyHost {
    /// Element box relative to its container
    fn element_rect(&self) -> Rect;

    /// Container box in document coordinates
    fn container_rect(&self) -> Rect;

    /// Left edge of the element's original parent in document coordinates
    fn anchor_left(&self) -> f64;

    fn viewport(&self) -> Size;

    /// Full scrollable height of the document
    fn document_height(&self) -> f64;

    /// Current vertical scroll offset
    fn scroll_offset(&self) -> f64;

    /// Move the element into a positioned wrapper of the given size inside
    /// the container. Wrapping an already wrapped element only resizes it.
    fn wrap(&mut self, size: Size);

    /// Put the element back into its original parent and drop the wrapper
    fn unwrap(&mut self);

    fn apply_style(&mut self, style: &WrapperStyle);
}
