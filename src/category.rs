//! Event categories

use std::fmt::{Display, Formatter};

use csscolorparser::Color;
use serde::{Deserialize, Serialize};

/// The color used whenever an event has no category, and the default for new categories
pub const DEFAULT_COLOR: &str = "#3498db";

/// The identifier the server assigned to a category
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// A category used to tag events and color-code the calendar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: Color,
}

impl Category {
    /// The category color as a hex string, suitable for inline styles
    pub fn hex_color(&self) -> String {
        self.color.to_hex_string()
    }
}

/// The payload submitted when creating or updating a category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub color: Color,
}

impl CategoryDraft {
    /// Build a draft, falling back to [`DEFAULT_COLOR`] if the color does not parse
    pub fn new<S: ToString>(name: S, color: &str) -> Self {
        let color = match color.parse::<Color>() {
            Ok(c) => c,
            Err(err) => {
                log::warn!("Invalid category color {:?} ({}), using the default", color, err);
                default_color()
            }
        };
        Self { name: name.to_string(), color }
    }
}

/// Returns [`DEFAULT_COLOR`] as a parsed [`Color`]
pub fn default_color() -> Color {
    DEFAULT_COLOR.parse().unwrap(/* the default color constant is a valid hex string */)
}
