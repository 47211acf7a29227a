use serde::{Deserialize, Serialize};

/// Extra style merged into the wrapper for one positioning mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub z_index: Option<i32>,
    pub transform: Option<String>,
    pub class_name: Option<String>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self.z_index.is_none() && self.transform.is_none() && self.class_name.is_none()
    }
}

/// Options for a sticky element.
///
/// `top_offset`/`bottom_offset` shrink the container band the element may
/// travel in; `window_top_offset`/`window_bottom_offset` keep the element
/// away from the viewport edges while it is fixed (e.g. under a fixed header).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyOptions {
    pub top_offset: f64,
    pub bottom_offset: f64,
    pub window_top_offset: f64,
    pub window_bottom_offset: f64,
    /// Attach as soon as the controller is constructed
    pub auto_attach: bool,
    pub fixed_style: StyleOverrides,
    pub absolute_style: StyleOverrides,
}

impl Default for StickyOptions {
    fn default() -> Self {
        Self {
            top_offset: 0.0,
            bottom_offset: 0.0,
            window_top_offset: 0.0,
            window_bottom_offset: 0.0,
            auto_attach: true,
            fixed_style: StyleOverrides::default(),
            absolute_style: StyleOverrides::default(),
        }
    }
}

impl StickyOptions {
    /// Names of offsets that are NaN or infinite
    pub fn non_finite_offsets(&self) -> Vec<&'static str> {
        [
            ("top_offset", self.top_offset),
            ("bottom_offset", self.bottom_offset),
            ("window_top_offset", self.window_top_offset),
            ("window_bottom_offset", self.window_bottom_offset),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
        .collect()
    }
}
