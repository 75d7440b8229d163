//! Component trait for menu renderers.

use crate::core::input_event::InputEvent;

/// A renderer driven by width and input events.
pub trait Component {
    /// Render to a list of lines at the given width.
    fn render(&mut self, width: usize) -> Vec<String>;

    /// Handle input events.
    fn handle_event(&mut self, _event: &InputEvent) {}

    /// `(row, column)` of the text cursor in the last rendered lines, if any.
    fn cursor_pos(&self) -> Option<(usize, usize)> {
        None
    }

    /// Invalidate any cached state.
    fn invalidate(&mut self) {}
}
