//! Width measurement collaborator.
//!
//! The engine never interprets widths; it only compares them against a budget when laying out
//! the horizontal strip. Hosts that draw with real fonts supply their own [`TextMeasure`].

use crate::core::text::width::visible_width_clamped;

pub trait TextMeasure {
    /// Rendered width of `text` including any per-item padding, clamped to `max`.
    fn width(&self, text: &str, max: usize) -> usize;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, usize) -> usize,
{
    fn width(&self, text: &str, max: usize) -> usize {
        self(text, max).min(max)
    }
}

/// Measures in terminal cells, adding `padding` cells around every string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMeasure {
    pub padding: usize,
}

impl Default for CellMeasure {
    fn default() -> Self {
        Self { padding: 2 }
    }
}

impl TextMeasure for CellMeasure {
    fn width(&self, text: &str, max: usize) -> usize {
        let budget = max.saturating_sub(self.padding);
        (visible_width_clamped(text, budget) + self.padding).min(max)
    }
}
