//! MenuList widget: renders a [`MenuEngine`] as terminal lines.

use std::ops::Range;

use crate::core::collaborators::PasteSelection;
use crate::core::component::Component;
use crate::core::input_event::InputEvent;
use crate::core::paginator::Layout;
use crate::core::text::width::{truncate_to_width, visible_width};
use crate::runtime::engine::{MenuEngine, MenuView, Outcome, Step, ViewItem};

pub struct MenuListTheme {
    pub prompt: Box<dyn Fn(&str) -> String>,
    pub selected: Box<dyn Fn(&str) -> String>,
    pub chosen: Box<dyn Fn(&str) -> String>,
    pub highlight: Box<dyn Fn(&str) -> String>,
    pub counter: Box<dyn Fn(&str) -> String>,
}

impl Default for MenuListTheme {
    fn default() -> Self {
        Self {
            prompt: Box::new(|text| text.to_string()),
            selected: Box::new(|text| text.to_string()),
            chosen: Box::new(|text| text.to_string()),
            highlight: Box::new(|text| text.to_string()),
            counter: Box::new(|text| text.to_string()),
        }
    }
}

fn marker(item: &ViewItem) -> &'static str {
    match (item.selected, item.chosen) {
        (true, true) => ">*",
        (true, false) => "> ",
        (false, true) => " *",
        (false, false) => "  ",
    }
}

fn pad_to(text: String, visible: usize, width: usize) -> String {
    let mut out = text;
    out.push_str(&" ".repeat(width.saturating_sub(visible)));
    out
}

pub struct MenuList {
    engine: MenuEngine,
    theme: MenuListTheme,
    on_finish: Option<Box<dyn FnMut(Outcome)>>,
    on_paste_request: Option<Box<dyn FnMut(PasteSelection)>>,
    last_step: Option<Step>,
    cursor: Option<(usize, usize)>,
}

impl MenuList {
    pub fn new(engine: MenuEngine, theme: MenuListTheme) -> Self {
        Self {
            engine,
            theme,
            on_finish: None,
            on_paste_request: None,
            last_step: None,
            cursor: None,
        }
    }

    pub fn engine(&self) -> &MenuEngine {
        &self.engine
    }

    pub fn into_engine(self) -> MenuEngine {
        self.engine
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.last_step.as_ref()
    }

    pub fn set_on_finish(&mut self, handler: Option<Box<dyn FnMut(Outcome)>>) {
        self.on_finish = handler;
    }

    pub fn set_on_paste_request(&mut self, handler: Option<Box<dyn FnMut(PasteSelection)>>) {
        self.on_paste_request = handler;
    }

    /// Display text clipped to `max` cells with highlight styling applied to matched bytes.
    fn styled_display(&self, item: &ViewItem, max: usize) -> (String, usize) {
        let visible = truncate_to_width(&item.display, max);
        let mut out = String::with_capacity(visible.len());
        let mut at = 0usize;
        for Range { start, end } in &item.highlights {
            let (start, end) = (*start, (*end).min(visible.len()));
            if start >= end || start < at {
                continue;
            }
            out.push_str(&visible[at..start]);
            out.push_str(&(self.theme.highlight)(&visible[start..end]));
            at = end;
        }
        out.push_str(&visible[at..]);
        (out, visible_width(visible))
    }

    fn render_item(&self, item: &ViewItem, width: usize) -> String {
        let mark = marker(item);
        let (text, text_width) = self.styled_display(item, width.saturating_sub(mark.len()));
        let line = format!("{mark}{text}");
        let line = if item.selected {
            (self.theme.selected)(&line)
        } else if item.chosen {
            (self.theme.chosen)(&line)
        } else {
            line
        };
        pad_to(line, mark.len() + text_width, width)
    }

    /// Column of the text cursor on the input line, clamped to `width`.
    fn cursor_column(view: &MenuView, width: usize) -> usize {
        let prompt = view.prompt.as_deref().unwrap_or("");
        let prompt_width = visible_width(truncate_to_width(prompt, width));
        let offset = if prompt_width == 0 { 0 } else { prompt_width + 1 };
        (offset + view.cursor_column).min(width)
    }

    fn input_line(&self, view: &MenuView, width: usize) -> (String, usize) {
        let prompt = view.prompt.as_deref().unwrap_or("");
        let prompt_part = truncate_to_width(prompt, width);
        let mut used = visible_width(prompt_part);
        let mut line = if prompt_part.is_empty() {
            String::new()
        } else {
            used += 1;
            format!("{} ", (self.theme.prompt)(prompt_part))
        };
        let input = truncate_to_width(&view.input, width.saturating_sub(used));
        used += visible_width(input);
        line.push_str(input);
        (line, used)
    }

    fn render_list(&self, view: &MenuView, width: usize, rows: usize, columns: usize) -> Vec<String> {
        let counter = (self.theme.counter)(&view.counter);
        let counter_width = visible_width(&view.counter);
        let (input, used) = self.input_line(view, width.saturating_sub(counter_width + 1));
        let mut lines = vec![format!(
            "{}{}",
            pad_to(input, used, width.saturating_sub(counter_width)),
            counter
        )];

        let cell_width = width / columns.max(1);
        for row in 0..rows {
            let mut line = String::new();
            let mut any = false;
            for column in 0..columns.max(1) {
                // Column-major: item i sits in column i / rows, row i % rows.
                match view.items.get(column * rows + row) {
                    Some(item) => {
                        any = true;
                        line.push_str(&self.render_item(item, cell_width));
                    }
                    None => line.push_str(&" ".repeat(cell_width)),
                }
            }
            if any {
                lines.push(line.trim_end().to_string());
            }
        }
        lines
    }

    fn render_strip(&self, view: &MenuView, width: usize) -> String {
        let input_width = width / 3;
        let (input, used) = self.input_line(view, input_width);
        let mut line = pad_to(input, used, input_width);
        line.push_str(if view.has_prev { "<" } else { " " });
        for item in &view.items {
            let (text, _) = self.styled_display(item, width);
            let cell = format!(" {text} ");
            let cell = if item.selected {
                (self.theme.selected)(&cell)
            } else if item.chosen {
                (self.theme.chosen)(&cell)
            } else {
                cell
            };
            line.push_str(&cell);
        }
        if view.has_next {
            line.push('>');
        }
        line.push(' ');
        line.push_str(&(self.theme.counter)(&view.counter));
        line
    }
}

impl Component for MenuList {
    fn render(&mut self, width: usize) -> Vec<String> {
        // The strip paginates against the width it is drawn at.
        if self.engine.options().lines == 0 && self.engine.strip_width() != width {
            self.engine.set_strip_width(width);
        }
        let view = self.engine.view();
        match view.layout {
            Layout::Fixed { rows, columns } => {
                let counter_width = visible_width(&view.counter);
                let input_width = width.saturating_sub(counter_width + 1);
                self.cursor = Some((0, Self::cursor_column(&view, input_width)));
                self.render_list(&view, width, rows, columns)
            }
            Layout::Measured { .. } => {
                self.cursor = Some((0, Self::cursor_column(&view, width / 3)));
                vec![self.render_strip(&view, width)]
            }
        }
    }

    fn cursor_pos(&self) -> Option<(usize, usize)> {
        self.cursor
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let step = self.engine.handle_event(event);
        match &step {
            Step::Finished(outcome) => {
                if let Some(handler) = self.on_finish.as_mut() {
                    handler(outcome.clone());
                }
            }
            Step::Paste(selection) => {
                if let Some(handler) = self.on_paste_request.as_mut() {
                    handler(*selection);
                }
            }
            Step::Redraw | Step::Unchanged => {}
        }
        self.last_step = Some(step);
    }

    fn invalidate(&mut self) {
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{MenuList, MenuListTheme};
    use crate::core::text::width::visible_width;
    use crate::config::MenuOptions;
    use crate::core::collaborators::PasteSelection;
    use crate::core::component::Component;
    use crate::core::input_event::InputEvent;
    use crate::core::item::{ItemStore, PrioritySet};
    use crate::runtime::engine::{MenuEngine, Outcome, OutcomeStatus};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine(options: MenuOptions, lines: &[&str]) -> MenuEngine {
        let store = ItemStore::from_lines(lines.iter().copied(), None, &PrioritySet::default());
        MenuEngine::new(options, store)
    }

    #[test]
    fn list_renders_input_counter_and_marked_rows() {
        let options = MenuOptions::new().fuzzy(false).lines(3).prompt("run:");
        let mut list = MenuList::new(engine(options, &["alpha", "beta", "gamma", "delta"]), MenuListTheme::default());
        list.handle_event(&InputEvent::key("down"));
        list.handle_event(&InputEvent::key("ctrl+enter"));
        let lines = list.render(20);
        assert_eq!(lines[0], "run:             4/4");
        assert_eq!(lines[1], "  alpha");
        assert_eq!(lines[2], ">*beta");
        assert_eq!(lines[3], "  gamma");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn cursor_follows_prompt_and_input() {
        let options = MenuOptions::new().fuzzy(false).lines(2).prompt("run:");
        let mut list = MenuList::new(engine(options, &["alpha"]), MenuListTheme::default());
        assert_eq!(list.cursor_pos(), None);
        list.handle_event(&InputEvent::text("al"));
        list.handle_event(&InputEvent::key("left"));
        list.render(40);
        assert_eq!(list.cursor_pos(), Some((0, 6)));
        list.invalidate();
        assert_eq!(list.cursor_pos(), None);
    }

    #[test]
    fn grid_renders_column_major() {
        let options = MenuOptions::new().fuzzy(false).lines(2).columns(2);
        let mut list = MenuList::new(engine(options, &["a", "b", "c", "d"]), MenuListTheme::default());
        let lines = list.render(10);
        assert_eq!(lines[1], "> a    c");
        assert_eq!(lines[2], "  b    d");
    }

    #[test]
    fn highlights_use_theme() {
        let theme = MenuListTheme {
            highlight: Box::new(|text| format!("[{text}]")),
            ..MenuListTheme::default()
        };
        let options = MenuOptions::new().fuzzy(false).lines(1);
        let mut list = MenuList::new(engine(options, &["firefox"]), theme);
        list.handle_event(&InputEvent::text("fire"));
        let lines = list.render(30);
        assert_eq!(lines[1], "> [fire]fox");
    }

    #[test]
    fn strip_renders_single_line_with_arrows() {
        let options = MenuOptions::new().fuzzy(false).lines(0).prompt(">");
        let items: Vec<String> = (0..20).map(|i| format!("entry{i}")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let mut list = MenuList::new(engine(options, &refs).with_strip_width(60), MenuListTheme::default());
        let lines = list.render(60);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(">"));
        assert!(lines[0].contains(" entry0 "));
        assert!(lines[0].ends_with("> 20/20"));
    }

    #[test]
    fn strip_paginates_to_the_render_width() {
        let options = MenuOptions::new().fuzzy(false).lines(0).prompt(">");
        let items: Vec<String> = (0..20).map(|i| format!("entry{i}")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let mut list = MenuList::new(engine(options, &refs), MenuListTheme::default());
        for width in [40, 60, 120] {
            let lines = list.render(width);
            assert_eq!(lines.len(), 1);
            assert!(
                visible_width(&lines[0]) <= width,
                "width {width}: {:?}",
                lines[0]
            );
            assert_eq!(list.engine().strip_width(), width);
        }
        let lines = list.render(40);
        assert!(lines[0].contains(" entry0 "));
        assert!(!lines[0].contains("entry1"));
        assert!(lines[0].ends_with("> 20/20"));
    }

    #[test]
    fn callbacks_fire_for_paste_and_finish() {
        let options = MenuOptions::new().fuzzy(false);
        let mut list = MenuList::new(engine(options, &["one", "two"]), MenuListTheme::default());

        let pastes: Rc<RefCell<Vec<PasteSelection>>> = Rc::new(RefCell::new(Vec::new()));
        let pastes_ref = pastes.clone();
        list.set_on_paste_request(Some(Box::new(move |selection| {
            pastes_ref.borrow_mut().push(selection);
        })));

        let finished: Rc<RefCell<Vec<Outcome>>> = Rc::new(RefCell::new(Vec::new()));
        let finished_ref = finished.clone();
        list.set_on_finish(Some(Box::new(move |outcome| {
            finished_ref.borrow_mut().push(outcome);
        })));

        list.handle_event(&InputEvent::key("ctrl+shift+y"));
        assert_eq!(pastes.borrow().as_slice(), &[PasteSelection::Clipboard]);

        list.handle_event(&InputEvent::key("down"));
        list.handle_event(&InputEvent::key("enter"));
        let finished = finished.borrow();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].status, OutcomeStatus::Accepted);
        assert_eq!(finished[0].output, vec!["two"]);
    }
}
