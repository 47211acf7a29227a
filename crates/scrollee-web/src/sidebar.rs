use std::cell::RefCell;
use std::time::Duration;

use scrollee_engine::scroll::{DEFAULT_SCROLL_END_DELAY, global};
use scrollee_engine::{StickyOptions, Sticky};
use wasm_bindgen::prelude::*;

use crate::JsOptions;
use crate::binding::ScrolleeBinding;
use crate::dom::DomHost;

thread_local! {
    static BINDING: RefCell<Option<ScrolleeBinding>> = const { RefCell::new(None) };
}

fn ensure_binding(scroll_end_delay: Duration) -> Result<(), JsValue> {
    BINDING.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.as_ref().is_some_and(ScrolleeBinding::is_listening) {
            return Ok(());
        }
        *slot = Some(ScrolleeBinding::install(scroll_end_delay)?);
        Ok(())
    })
}

fn parse_options(options: JsValue) -> Result<JsOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(JsOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {e}")))
}

/// Remove the window listeners and drop the shared broadcaster.
///
/// Existing sidebars stop moving but keep their wrapper until `detach()`;
/// constructing a new one starts over.
#[wasm_bindgen(js_name = scrolleeTeardown)]
pub fn teardown() {
    BINDING.with(|cell| cell.borrow_mut().take());
    global::teardown();
}

/// A sidebar that sticks to the viewport while its container scrolls past
#[wasm_bindgen]
pub struct StickySidebar {
    sticky: Sticky<DomHost>,
}

#[wasm_bindgen]
impl StickySidebar {
    #[wasm_bindgen(constructor)]
    pub fn new(
        element_id: &str,
        container_id: &str,
        options: JsValue,
    ) -> Result<StickySidebar, JsValue> {
        let options = parse_options(options)?;
        let delay = options
            .scroll_end_delay
            .filter(|millis| millis.is_finite() && *millis >= 0.0)
            .map(|millis| Duration::from_secs_f64(millis / 1000.0))
            .unwrap_or(DEFAULT_SCROLL_END_DELAY);

        let host = DomHost::new(element_id, container_id)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let options: StickyOptions = options.into();
        ensure_binding(delay)?;

        let sticky = global::with(|broadcaster| {
            broadcaster.enable();
            Sticky::new(host, options, broadcaster)
        })
        .ok_or_else(|| JsValue::from_str("scroll broadcaster is not running"))?;

        Ok(Self { sticky })
    }

    /// Returns false if already attached
    pub fn attach(&self) -> bool {
        global::with(|broadcaster| self.sticky.attach(broadcaster)).unwrap_or(false)
    }

    /// Returns false if already detached. Still restores the element after
    /// `scrolleeTeardown()`.
    pub fn detach(&self) -> bool {
        global::with(|broadcaster| self.sticky.detach(broadcaster))
            .unwrap_or_else(|| self.sticky.release())
    }

    /// Re-measure after the layout changed without a window resize
    #[wasm_bindgen(js_name = updateInfo)]
    pub fn update_info(&self) {
        self.sticky.update_info();
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.sticky.status().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn positioning(&self) -> String {
        self.sticky.positioning().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn attached(&self) -> bool {
        self.sticky.is_attached()
    }

    /// Current geometry as a plain JS object
    pub fn geometry(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sticky.geometry())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }
}
