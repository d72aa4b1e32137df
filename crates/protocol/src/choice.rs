use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One-shot override for the position and size of the next choice window.
///
/// Negative coordinates and sizes, and a row count of zero or less, keep the engine's own value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ChoicePlacement {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "row")]
    pub rows: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for ChoicePlacement {
    fn default() -> Self {
        Self {
            x: -1,
            y: -1,
            rows: 0,
            width: -1,
            height: -1,
        }
    }
}

impl ChoicePlacement {
    pub fn rows(&self) -> Option<usize> {
        usize::try_from(self.rows).ok().filter(|rows| *rows > 0)
    }

    pub fn width(&self) -> Option<u32> {
        u32::try_from(self.width).ok().filter(|w| *w > 0)
    }

    pub fn height(&self) -> Option<u32> {
        u32::try_from(self.height).ok().filter(|h| *h > 0)
    }

    pub fn x(&self) -> Option<u32> {
        u32::try_from(self.x).ok()
    }

    pub fn y(&self) -> Option<u32> {
        u32::try_from(self.y).ok()
    }
}
