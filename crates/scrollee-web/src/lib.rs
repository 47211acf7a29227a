//! Browser front end for scrollee.
//!
//! On wasm32 this crate exports `StickySidebar` to JavaScript:
//!
//! ```js
//! const sidebar = new StickySidebar("toc", "main", { windowTopOffset: 64 });
//! sidebar.updateInfo();
//! ```
//!
//! Window `scroll` and `resize` events feed the global broadcaster through a
//! single [`ScrolleeBinding`] that is installed with the first sidebar.

#[cfg(target_arch = "wasm32")]
mod binding;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod sidebar;

#[cfg(target_arch = "wasm32")]
pub use binding::ScrolleeBinding;
#[cfg(target_arch = "wasm32")]
pub use dom::DomHost;
#[cfg(target_arch = "wasm32")]
pub use sidebar::StickySidebar;

use scrollee_engine::{StickyOptions, StyleOverrides, WrapperStyle};
use serde::Deserialize;

/// Transform the wrapper carries unless a style override replaces it
pub const WRAPPER_TRANSFORM: &str = "translate3d(0,0,0)";

/// Style overrides as passed from JavaScript
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsStyle {
    pub z_index: Option<i32>,
    pub transform: Option<String>,
    pub class_name: Option<String>,
}

impl From<JsStyle> for StyleOverrides {
    fn from(style: JsStyle) -> Self {
        Self {
            z_index: style.z_index,
            transform: style.transform,
            class_name: style.class_name,
        }
    }
}

/// The options object accepted by the `StickySidebar` constructor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsOptions {
    pub top_offset: f64,
    pub bottom_offset: f64,
    pub window_top_offset: f64,
    pub window_bottom_offset: f64,
    pub auto_attach: bool,
    pub fixed_style: JsStyle,
    pub absolute_style: JsStyle,
    /// Milliseconds; only honoured by the first sidebar on the page
    pub scroll_end_delay: Option<f64>,
}

impl Default for JsOptions {
    fn default() -> Self {
        Self {
            top_offset: 0.0,
            bottom_offset: 0.0,
            window_top_offset: 0.0,
            window_bottom_offset: 0.0,
            auto_attach: true,
            fixed_style: JsStyle::default(),
            absolute_style: JsStyle::default(),
            scroll_end_delay: None,
        }
    }
}

impl From<JsOptions> for StickyOptions {
    fn from(options: JsOptions) -> Self {
        Self {
            top_offset: options.top_offset,
            bottom_offset: options.bottom_offset,
            window_top_offset: options.window_top_offset,
            window_bottom_offset: options.window_bottom_offset,
            auto_attach: options.auto_attach,
            fixed_style: options.fixed_style.into(),
            absolute_style: options.absolute_style.into(),
        }
    }
}

/// Inline style writes for the wrapper: `Some` sets a property, `None`
/// removes it.
///
/// Every property the controller may have touched is listed, so leftovers
/// from the previous positioning mode are cleared.
pub fn css_updates(style: &WrapperStyle) -> Vec<(&'static str, Option<String>)> {
    let overrides = &style.overrides;
    vec![
        ("position", Some(style.position.as_css().to_string())),
        ("top", Some(style.top.to_string())),
        ("bottom", Some(style.bottom.to_string())),
        ("left", Some(style.left.to_string())),
        ("z-index", overrides.z_index.map(|z_index| z_index.to_string())),
        (
            "transform",
            Some(
                overrides
                    .transform
                    .clone()
                    .unwrap_or_else(|| WRAPPER_TRANSFORM.to_string()),
            ),
        ),
    ]
}

/// Class attribute for the wrapper in the given style
pub fn wrapper_class(style: &WrapperStyle) -> &str {
    style.overrides.class_name.as_deref().unwrap_or("")
}
