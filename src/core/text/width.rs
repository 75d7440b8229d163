//! Grapheme width and visible width helpers.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    let mut width = 0;
    for ch in grapheme.chars() {
        if ch == '\t' {
            width += TAB_WIDTH;
            continue;
        }
        width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }
    width
}

/// Terminal cell width of `input`.
pub fn visible_width(input: &str) -> usize {
    input.graphemes(true).map(grapheme_width).sum()
}

/// Width of `input`, stopping early once `max` cells are reached.
pub fn visible_width_clamped(input: &str, max: usize) -> usize {
    let mut width = 0;
    for grapheme in input.graphemes(true) {
        width += grapheme_width(grapheme);
        if width >= max {
            return max;
        }
    }
    width
}

/// Longest prefix of `input` that fits in `max` cells, cut on a grapheme boundary.
pub fn truncate_to_width(input: &str, max: usize) -> &str {
    let mut width = 0;
    for (offset, grapheme) in input.grapheme_indices(true) {
        let next = width + grapheme_width(grapheme);
        if next > max {
            return &input[..offset];
        }
        width = next;
    }
    input
}
