pub mod geometry;
pub mod host;
pub mod options;
pub mod scroll;
pub mod sticky;
pub mod style;


// Re-export key types for easier usage
pub use geometry::{Geometry, Rect, Size};
pub use host::StickyHost;
pub use options::{StickyOptions, StyleOverrides};
pub use scroll::{
    Direction, Listening, ListenerId, ScrollBroadcaster, ScrollEvent, ScrollEventKind,
    ScrollListener,
};
pub use sticky::{Positioning, Status, Sticky, StickyController, StickyError};
pub use style::{Length, Position, WrapperStyle};
