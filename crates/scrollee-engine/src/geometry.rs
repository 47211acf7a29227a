use serde::{Deserialize, Serialize};

use crate::host::StickyHost;
use crate::options::StickyOptions;

/// Axis-aligned box in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Express this rect relative to the top-left corner of `origin`
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect {
            top: self.top - origin.top,
            left: self.left - origin.left,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Cached measurements the sticky controller works from.
///
/// Container values are in document coordinates, element values are relative
/// to the container. Everything is re-measured on attach and on resize; scroll
/// handling never touches the host for measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Geometry {
    pub container_top: f64,
    pub container_bottom: f64,
    pub container_height: f64,
    pub element_top: f64,
    pub element_left: f64,
    pub element_height: f64,
    pub element_width: f64,
    /// Left edge of the element's original parent, used while fixed
    pub element_fixed_left: f64,
    pub window_width: f64,
    pub window_height: f64,
    /// Largest valid scroll offset, never negative
    pub max_scroll: f64,
    /// Whether the element fits between the window offsets
    pub fits_viewport: bool,
}

impl Geometry {
    pub fn measure<H: StickyHost + ?Sized>(host: &H, options: &StickyOptions) -> Self {
        let element = host.element_rect();
        let container = host.container_rect();
        let viewport = host.viewport();

        let usable_window =
            viewport.height - options.window_top_offset - options.window_bottom_offset;

        Self {
            container_top: container.top,
            container_bottom: container.bottom(),
            container_height: container.height,
            element_top: element.top,
            element_left: element.left,
            element_height: element.height,
            element_width: element.width,
            element_fixed_left: host.anchor_left(),
            window_width: viewport.width,
            window_height: viewport.height,
            max_scroll: (host.document_height() - viewport.height).max(0.0),
            fits_viewport: element.height < usable_window,
        }
    }

    /// Container height left once the top and bottom offsets are taken out
    pub fn usable_container_height(&self, options: &StickyOptions) -> f64 {
        self.container_height - options.top_offset - options.bottom_offset
    }

    /// Whether there is room for the element to move inside its container
    pub fn needs_sticking(&self, options: &StickyOptions) -> bool {
        self.element_height < self.usable_container_height(options)
    }

    /// Clamp a raw scroll offset into `[0, max_scroll]`.
    ///
    /// Elastic overscroll reports offsets outside the document.
    pub fn clamp_offset(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll)
    }

    pub fn element_size(&self) -> Size {
        Size::new(self.element_width, self.element_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::standard_host;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(100.0, 20.0, 300.0, 50.0);
        assert_eq!(rect.bottom(), 150.0);
        assert_eq!(rect.right(), 320.0);
    }

    #[test]
    fn test_rect_relative_to_keeps_size() {
        let container = Rect::new(200.0, 50.0, 800.0, 2000.0);
        let element = Rect::new(260.0, 70.0, 200.0, 400.0);

        let relative = element.relative_to(&container);

        assert_eq!(relative, Rect::new(60.0, 20.0, 200.0, 400.0));
    }

    #[test]
    fn test_measure_standard_page() {
        let host = standard_host(400.0);
        let geometry = Geometry::measure(&host, &StickyOptions::default());

        assert_eq!(
            geometry,
            Geometry {
                container_top: 200.0,
                container_bottom: 2200.0,
                container_height: 2000.0,
                element_top: 0.0,
                element_left: 620.0,
                element_height: 400.0,
                element_width: 180.0,
                element_fixed_left: 620.0,
                window_width: 1024.0,
                window_height: 600.0,
                max_scroll: 1900.0,
                fits_viewport: true,
            }
        );
    }

    #[test]
    fn test_fits_viewport_respects_window_offsets() {
        let host = standard_host(400.0);
        let options = StickyOptions {
            window_top_offset: 100.0,
            window_bottom_offset: 100.0,
            ..StickyOptions::default()
        };

        let geometry = Geometry::measure(&host, &options);

        // 600 - 100 - 100 leaves exactly the element height, which does not fit
        assert!(!geometry.fits_viewport);
    }

    #[test]
    fn test_max_scroll_never_negative() {
        let mut host = standard_host(400.0);
        host.page_mut().document_height = 300.0;

        let geometry = Geometry::measure(&host, &StickyOptions::default());

        assert_eq!(geometry.max_scroll, 0.0);
    }

    #[rstest]
    #[case(-40.0, 0.0)]
    #[case(0.0, 0.0)]
    #[case(750.0, 750.0)]
    #[case(1900.0, 1900.0)]
    #[case(2500.0, 1900.0)]
    fn test_clamp_offset(#[case] raw: f64, #[case] expected: f64) {
        let host = standard_host(400.0);
        let geometry = Geometry::measure(&host, &StickyOptions::default());

        assert_eq!(geometry.clamp_offset(raw), expected);
    }

    #[rstest]
    #[case(1999.0, 0.0, 0.0, false)]
    #[case(1500.0, 0.0, 0.0, true)]
    #[case(1500.0, 300.0, 200.0, false)]
    #[case(1500.0, 250.0, 200.0, true)]
    fn test_needs_sticking(
        #[case] element_height: f64,
        #[case] top_offset: f64,
        #[case] bottom_offset: f64,
        #[case] expected: bool,
    ) {
        let host = standard_host(element_height);
        let options = StickyOptions {
            top_offset,
            bottom_offset,
            ..StickyOptions::default()
        };
        let geometry = Geometry::measure(&host, &options);

        assert_eq!(geometry.needs_sticking(&options), expected);
    }
}
