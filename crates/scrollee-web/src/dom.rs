use scrollee_engine::{Rect, Size, StickyError, StickyHost, WrapperStyle};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Node, Window};

use crate::{WRAPPER_TRANSFORM, css_updates, wrapper_class};

fn host_error(context: &str, value: JsValue) -> StickyError {
    StickyError::Host(format!("{context}: {value:?}"))
}

fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// [`StickyHost`] backed by the live DOM.
///
/// The element is moved into an absolutely positioned wrapper `div` appended
/// to the container while attached, and put back where it came from on
/// unwrap.
pub struct DomHost {
    window: Window,
    element: HtmlElement,
    container: HtmlElement,
    parent: Node,
    next_sibling: Option<Node>,
    wrapper: HtmlElement,
    wrapped: bool,
}

impl DomHost {
    pub fn new(element_id: &str, container_id: &str) -> Result<Self, StickyError> {
        let window =
            web_sys::window().ok_or_else(|| StickyError::Host("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| StickyError::Host("no document".to_string()))?;

        let element = html_element(&document, element_id)
            .ok_or_else(|| StickyError::MissingElement(element_id.to_string()))?;
        let container = html_element(&document, container_id)
            .ok_or_else(|| StickyError::MissingContainer(container_id.to_string()))?;
        let parent = element
            .parent_node()
            .ok_or_else(|| StickyError::MissingElement(element_id.to_string()))?;

        let wrapper = document
            .create_element("div")
            .map_err(|e| host_error("creating wrapper", e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| StickyError::Host("wrapper is not an HTML element".to_string()))?;
        let style = wrapper.style();
        style
            .set_property("position", "absolute")
            .and_then(|_| style.set_property("transform", WRAPPER_TRANSFORM))
            .map_err(|e| host_error("styling wrapper", e))?;

        Ok(Self {
            window,
            element,
            container,
            parent,
            next_sibling: None,
            wrapper,
            wrapped: false,
        })
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    fn scroll_x(&self) -> f64 {
        self.window.scroll_x().unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn document_element(&self) -> Option<Element> {
        self.window
            .document()
            .and_then(|document| document.document_element())
    }

    fn set_size(&self, size: Size) {
        let style = self.wrapper.style();
        if let Err(e) = style
            .set_property("width", &format!("{}px", size.width))
            .and_then(|_| style.set_property("height", &format!("{}px", size.height)))
        {
            log::warn!("failed to size sticky wrapper: {e:?}");
        }
    }
}

impl StickyHost for DomHost {
    fn element_rect(&self) -> Rect {
        let element = self.element.get_bounding_client_rect();
        let container = self.container.get_bounding_client_rect();
        Rect::new(
            element.top() - container.top(),
            element.left() - container.left(),
            element.width(),
            element.height(),
        )
    }

    fn container_rect(&self) -> Rect {
        let rect = self.container.get_bounding_client_rect();
        Rect::new(
            rect.top() + self.scroll_y(),
            rect.left() + self.scroll_x(),
            rect.width(),
            rect.height(),
        )
    }

    fn anchor_left(&self) -> f64 {
        match self.parent.dyn_ref::<Element>() {
            Some(parent) => parent.get_bounding_client_rect().left() + self.scroll_x(),
            None => self.element.get_bounding_client_rect().left() + self.scroll_x(),
        }
    }

    fn viewport(&self) -> Size {
        match self.document_element() {
            Some(root) => Size::new(root.client_width() as f64, root.client_height() as f64),
            None => Size::default(),
        }
    }

    fn document_height(&self) -> f64 {
        self.document_element()
            .map(|root| root.scroll_height() as f64)
            .unwrap_or(0.0)
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_y()
    }

    fn wrap(&mut self, size: Size) {
        self.set_size(size);
        if self.wrapped {
            return;
        }

        self.next_sibling = self.element.next_sibling();
        let moved = self
            .wrapper
            .append_child(&self.element)
            .and_then(|_| self.container.append_child(&self.wrapper));
        match moved {
            Ok(_) => self.wrapped = true,
            Err(e) => log::warn!("failed to wrap sticky element: {e:?}"),
        }
    }

    fn unwrap(&mut self) {
        if !self.wrapped {
            return;
        }

        if let Err(e) = self
            .parent
            .insert_before(&self.element, self.next_sibling.as_ref())
        {
            log::warn!("failed to restore sticky element: {e:?}");
        }
        self.wrapper.remove();
        self.next_sibling = None;
        self.wrapped = false;
    }

    fn apply_style(&mut self, style: &WrapperStyle) {
        let css = self.wrapper.style();
        for (property, value) in css_updates(style) {
            let result = match value {
                Some(value) => css.set_property(property, &value),
                None => css.remove_property(property).map(|_| ()),
            };
            if let Err(e) = result {
                log::warn!("failed to set wrapper {property}: {e:?}");
            }
        }
        self.wrapper.set_class_name(wrapper_class(style));
    }
}
