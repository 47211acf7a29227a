use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::{Rect, Size};
use crate::host::StickyHost;
use crate::sticky::StickyError;
use crate::style::{Length, Position, WrapperStyle};

/// A named box on a simulated page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBox {
    /// Document coordinates
    pub rect: Rect,
    pub parent: Option<String>,
}

/// In-memory page: a viewport scrolled over a document of named boxes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedPage {
    pub viewport: Size,
    pub document_height: f64,
    /// Raw offset; may sit outside the document to mimic elastic overscroll
    pub scroll_offset: f64,
    pub boxes: BTreeMap<String, PageBox>,
}

impl SimulatedPage {
    pub fn new(viewport: Size, document_height: f64) -> Self {
        Self {
            viewport,
            document_height,
            scroll_offset: 0.0,
            boxes: BTreeMap::new(),
        }
    }

    pub fn with_box(mut self, id: &str, rect: Rect, parent: Option<&str>) -> Self {
        self.boxes.insert(
            id.to_string(),
            PageBox {
                rect,
                parent: parent.map(str::to_string),
            },
        );
        self
    }

    pub fn box_rect(&self, id: &str) -> Option<Rect> {
        self.boxes.get(id).map(|page_box| page_box.rect)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport.height).max(0.0)
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, self.max_scroll());
        self.scroll_offset
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Wrapper {
    size: Size,
    style: Option<WrapperStyle>,
}

/// [`StickyHost`] over a [`SimulatedPage`], tracking the wrapper the way a
/// browser would render it
#[derive(Debug, Clone)]
pub struct PageHost {
    page: SimulatedPage,
    element_id: String,
    container_id: String,
    wrapper: Option<Wrapper>,
    history: Vec<WrapperStyle>,
}

impl PageHost {
    pub fn new(
        page: SimulatedPage,
        element_id: &str,
        container_id: &str,
    ) -> Result<Self, StickyError> {
        if !page.boxes.contains_key(element_id) {
            return Err(StickyError::MissingElement(element_id.to_string()));
        }
        if !page.boxes.contains_key(container_id) {
            return Err(StickyError::MissingContainer(container_id.to_string()));
        }

        Ok(Self {
            page,
            element_id: element_id.to_string(),
            container_id: container_id.to_string(),
            wrapper: None,
            history: Vec::new(),
        })
    }

    pub fn page(&self) -> &SimulatedPage {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut SimulatedPage {
        &mut self.page
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapper.is_some()
    }

    pub fn wrapper_size(&self) -> Option<Size> {
        self.wrapper.as_ref().map(|wrapper| wrapper.size)
    }

    pub fn wrapper_style(&self) -> Option<&WrapperStyle> {
        self.wrapper.as_ref().and_then(|wrapper| wrapper.style.as_ref())
    }

    /// Every style applied so far, oldest first
    pub fn history(&self) -> &[WrapperStyle] {
        &self.history
    }

    fn element_box(&self) -> Rect {
        self.page
            .box_rect(&self.element_id)
            .unwrap_or_default()
    }

    fn container_box(&self) -> Rect {
        self.page
            .box_rect(&self.container_id)
            .unwrap_or_default()
    }

    /// Where the element's top edge currently sits, in document coordinates
    pub fn element_document_top(&self) -> f64 {
        self.element_viewport_top() + self.page.scroll_offset
    }

    /// Where the element's top edge currently sits, relative to the viewport
    pub fn element_viewport_top(&self) -> f64 {
        let element = self.element_box();
        let container = self.container_box();
        let scroll = self.page.scroll_offset;

        let Some(wrapper) = &self.wrapper else {
            return element.top - scroll;
        };
        let Some(style) = &wrapper.style else {
            return element.top - scroll;
        };

        match (style.position, style.top, style.bottom) {
            (Position::Fixed, Length::Px(top), _) => top,
            (Position::Fixed, Length::Auto, Length::Px(bottom)) => {
                self.page.viewport.height - bottom - wrapper.size.height
            }
            (Position::Absolute, Length::Px(top), _) => container.top + top - scroll,
            _ => element.top - scroll,
        }
    }

    /// Horizontal position of the element's left edge in document coordinates
    pub fn element_document_left(&self) -> f64 {
        let element = self.element_box();
        let container = self.container_box();

        match self.wrapper_style() {
            Some(style) => match (style.position, style.left) {
                (Position::Fixed, Length::Px(left)) => left,
                (Position::Absolute, Length::Px(left)) => container.left + left,
                _ => element.left,
            },
            None => element.left,
        }
    }
}

impl StickyHost for PageHost {
    fn element_rect(&self) -> Rect {
        self.element_box().relative_to(&self.container_box())
    }

    fn container_rect(&self) -> Rect {
        self.container_box()
    }

    fn anchor_left(&self) -> f64 {
        self.page
            .boxes
            .get(&self.element_id)
            .and_then(|element| element.parent.as_deref())
            .and_then(|parent| self.page.box_rect(parent))
            .unwrap_or_else(|| self.element_box())
            .left
    }

    fn viewport(&self) -> Size {
        self.page.viewport
    }

    fn document_height(&self) -> f64 {
        self.page.document_height
    }

    fn scroll_offset(&self) -> f64 {
        self.page.scroll_offset
    }

    fn wrap(&mut self, size: Size) {
        match &mut self.wrapper {
            Some(wrapper) => wrapper.size = size,
            None => self.wrapper = Some(Wrapper { size, style: None }),
        }
    }

    fn unwrap(&mut self) {
        self.wrapper = None;
    }

    fn apply_style(&mut self, style: &WrapperStyle) {
        if let Some(wrapper) = &mut self.wrapper {
            wrapper.style = Some(style.clone());
        }
        self.history.push(style.clone());
    }
}
