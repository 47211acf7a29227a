use std::fmt;

use serde::Serialize;

use crate::options::StyleOverrides;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Absolute,
    Fixed,
}

impl Position {
    pub fn as_css(&self) -> &'static str {
        match self {
            Position::Absolute => "absolute",
            Position::Fixed => "fixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Length {
    Px(f64),
    Auto,
}

impl Length {
    pub fn px(&self) -> Option<f64> {
        match self {
            Length::Px(value) => Some(*value),
            Length::Auto => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(value) => write!(f, "{value}px"),
            Length::Auto => f.write_str("auto"),
        }
    }
}

/// Style the controller writes to the wrapper on every positioning change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrapperStyle {
    pub position: Position,
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub overrides: StyleOverrides,
}

impl WrapperStyle {
    /// Absolute placement inside the container
    pub fn absolute(top: f64, left: f64, overrides: &StyleOverrides) -> Self {
        Self {
            position: Position::Absolute,
            top: Length::Px(top),
            bottom: Length::Auto,
            left: Length::Px(left),
            overrides: overrides.clone(),
        }
    }

    /// Fixed placement pinned to the top of the viewport
    pub fn fixed_top(top: f64, left: f64, overrides: &StyleOverrides) -> Self {
        Self {
            position: Position::Fixed,
            top: Length::Px(top),
            bottom: Length::Auto,
            left: Length::Px(left),
            overrides: overrides.clone(),
        }
    }

    /// Fixed placement pinned to the bottom of the viewport
    pub fn fixed_bottom(bottom: f64, left: f64, overrides: &StyleOverrides) -> Self {
        Self {
            position: Position::Fixed,
            top: Length::Auto,
            bottom: Length::Px(bottom),
            left: Length::Px(left),
            overrides: overrides.clone(),
        }
    }

    /// CSS property/value pairs, without the class name
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        let mut declarations = vec![
            ("position", self.position.as_css().to_string()),
            ("top", self.top.to_string()),
            ("bottom", self.bottom.to_string()),
            ("left", self.left.to_string()),
        ];
        if let Some(z_index) = self.overrides.z_index {
            declarations.push(("z-index", z_index.to_string()));
        }
        if let Some(ref transform) = self.overrides.transform {
            declarations.push(("transform", transform.clone()));
        }
        declarations
    }

    pub fn to_css(&self) -> String {
        self.declarations()
            .into_iter()
            .map(|(property, value)| format!("{property}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
