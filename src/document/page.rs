//! Page model produced by the layout engine and consumed by the PDF writer.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page and `y` growing downwards. Text `y` is the baseline.

use serde::Serialize;

use super::fonts::FontWeight;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 1008.0;
pub const MARGIN: f32 = 72.0;
pub const CONTENT_LEFT: f32 = MARGIN;
pub const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;
pub const CONTENT_TOP: f32 = MARGIN;
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN;
pub const CONTENT_WIDTH: f32 = CONTENT_RIGHT - CONTENT_LEFT;

/// Horizontal anchor of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Which header logo an image placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogoSlot {
    Left,
    Right,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        align: Align,
        content: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        /// Gray level of the fill, `None` for an outline only.
        fill_gray: Option<f32>,
        stroke: bool,
    },
    Image {
        slot: LogoSlot,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// A fixed-size page of drawing instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
        }
    }

    /// Text runs on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }
}
