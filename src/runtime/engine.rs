//! Menu session: the single owner of buffer, matches, selection, page and history.
//!
//! Every input event is handled to completion before the next one. Edits rebuild the match list
//! and reset the selection to its head; navigation only moves the selection and re-anchors the
//! page when the selection leaves it.

use std::io::BufRead;
use std::ops::Range;

use history_store::{Direction as HistoryDirection, HistoryOptions, HistoryStore};
use tracing::{debug, info, warn};

use crate::config::MenuOptions;
use crate::core::buffer::{Direction, TextBuffer};
use crate::core::collaborators::{DynamicSource, PasteSelection};
use crate::core::input_event::{normalize_key_id, InputEvent, KeyId};
use crate::core::item::{ItemStore, PrioritySet};
use crate::core::keybindings::{MenuAction, MenuKeybindingsManager};
use crate::core::matcher::{highlight_ranges, is_instant_candidate, match_items, MatchList};
use crate::core::measure::{CellMeasure, TextMeasure};
use crate::core::paginator::{page_containing, paginate, Layout, Page};
use crate::core::selection::Selection;
use crate::error::MenuError;

/// Strip width assumed until the host reports its own.
pub const DEFAULT_STRIP_WIDTH: usize = 80;

const PASSWORD_MASK: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Editing,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Accepted,
    /// Raw query accepted, ignoring the selection.
    AcceptedInput,
    InstantAccepted,
    Cancelled,
    /// One of the configured expect keys was pressed.
    Expected(KeyId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub output: Vec<String>,
}

impl Outcome {
    /// Output texts joined by newlines.
    pub fn text(&self) -> String {
        self.output.join("\n")
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OutcomeStatus::Cancelled
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Redraw,
    Unchanged,
    /// The host should fetch the selection and deliver it as [`InputEvent::Paste`].
    Paste(PasteSelection),
    Finished(Outcome),
}

impl Step {
    fn redraw_if(changed: bool) -> Self {
        if changed {
            Step::Redraw
        } else {
            Step::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewItem {
    pub id: usize,
    /// Position in the match list.
    pub position: usize,
    pub display: String,
    pub selected: bool,
    pub chosen: bool,
    /// Byte ranges of `display` matched by the query.
    pub highlights: Vec<Range<usize>>,
}

/// Snapshot of everything a render sink needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub prompt: Option<String>,
    /// Query text, masked in password mode.
    pub input: String,
    /// Cursor byte offset into `input`.
    pub cursor: usize,
    /// Cells between the start of `input` and the cursor.
    pub cursor_column: usize,
    pub items: Vec<ViewItem>,
    pub layout: Layout,
    pub has_prev: bool,
    pub has_next: bool,
    pub counter: String,
    pub state: EngineState,
}

fn history_options(options: &MenuOptions) -> HistoryOptions {
    HistoryOptions {
        max_entries: options.max_history,
        dedup: options.history_dedup,
    }
}

pub struct MenuEngine {
    options: MenuOptions,
    keybindings: MenuKeybindingsManager,
    priority: PrioritySet,
    store: ItemStore,
    buffer: TextBuffer,
    matches: MatchList,
    selection: Selection,
    page: Page,
    history: HistoryStore,
    measure: Box<dyn TextMeasure>,
    dynamic: Option<Box<dyn DynamicSource>>,
    strip_width: usize,
    state: EngineState,
    outcome: Option<Outcome>,
}

impl MenuEngine {
    /// Starts a session over `store`: seeds the query, runs the first match and applies the
    /// preselection. With instant-accept and a matching initial query the session may already be
    /// terminated when this returns; check [`MenuEngine::outcome`].
    pub fn new(options: MenuOptions, store: ItemStore) -> Self {
        let history = HistoryStore::in_memory(history_options(&options));
        Self::start(options, store, history)
    }

    fn start(options: MenuOptions, store: ItemStore, history: HistoryStore) -> Self {
        let options = options.validate();
        let store = if options.password {
            ItemStore::default()
        } else {
            store
        };
        let mut buffer = TextBuffer::new(options.buffer_capacity, &options.word_delimiters);
        if let Some(text) = options.initial_text.as_deref() {
            buffer.set_text(text.as_bytes());
        }
        info!(
            items = store.len(),
            fuzzy = options.fuzzy,
            lines = options.lines,
            columns = options.columns,
            "menu session started"
        );

        let mut engine = Self {
            priority: options.priority_set(),
            options,
            keybindings: MenuKeybindingsManager::default(),
            store,
            buffer,
            matches: MatchList::default(),
            selection: Selection::new(),
            page: Page::default(),
            history,
            measure: Box::new(CellMeasure::default()),
            dynamic: None,
            strip_width: DEFAULT_STRIP_WIDTH,
            state: EngineState::Editing,
            outcome: None,
        };
        engine.rematch();
        engine.preselect();
        engine
    }

    /// Reads items from `reader` and the history log named in the options.
    ///
    /// Password sessions never read items.
    pub fn from_reader<R: BufRead>(reader: R, options: MenuOptions) -> Result<Self, MenuError> {
        let store = if options.password {
            ItemStore::default()
        } else {
            ItemStore::from_reader(reader, options.separator, &options.priority_set())?
        };
        let history = match options.history_path.as_deref() {
            Some(path) => HistoryStore::load(path, history_options(&options))?,
            None => HistoryStore::in_memory(history_options(&options)),
        };
        if history.skipped_lines() > 0 {
            warn!(skipped = history.skipped_lines(), "history contained unreadable lines");
        }
        Ok(Self::start(options, store, history))
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn with_keybindings(mut self, keybindings: MenuKeybindingsManager) -> Self {
        self.keybindings = keybindings;
        self
    }

    pub fn with_measure<M: TextMeasure + 'static>(mut self, measure: M) -> Self {
        self.measure = Box::new(measure);
        self.reanchor();
        self
    }

    pub fn with_strip_width(mut self, width: usize) -> Self {
        self.set_strip_width(width);
        self
    }

    /// Installs a refresh hook and rematches through it.
    pub fn with_dynamic_source<D: DynamicSource + 'static>(mut self, source: D) -> Self {
        self.dynamic = Some(Box::new(source));
        if self.state == EngineState::Editing {
            self.rematch();
        }
        self
    }

    /// Width available to the horizontal strip, in measurement units.
    pub fn strip_width(&self) -> usize {
        self.strip_width
    }

    pub fn set_strip_width(&mut self, width: usize) {
        self.strip_width = width;
        self.reanchor();
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    pub fn query(&self) -> String {
        self.buffer.text().into_owned()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn matches(&self) -> &MatchList {
        &self.matches
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Display text of the highlighted item.
    pub fn selected_display(&self) -> Option<&str> {
        self.selection
            .current_id(&self.matches)
            .and_then(|id| self.store.get(id))
            .map(|item| item.display())
    }

    pub fn counter(&self) -> String {
        format!("{}/{}", self.matches.len(), self.store.len())
    }

    /// Shorthand for a key event.
    pub fn press(&mut self, key_id: &str) -> Step {
        self.handle_event(&InputEvent::key(key_id))
    }

    /// Shorthand for a text event.
    pub fn type_text(&mut self, text: &str) -> Step {
        self.handle_event(&InputEvent::text(text))
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> Step {
        if self.state == EngineState::Terminated {
            return Step::Unchanged;
        }
        match event {
            InputEvent::Text { text } => self.insert_text(text),
            InputEvent::Paste { bytes } => self.paste(bytes),
            InputEvent::Key { key_id } => self.handle_key(&normalize_key_id(key_id)),
        }
    }

    fn handle_key(&mut self, key_id: &str) -> Step {
        if self.options.expect_keys.iter().any(|key| key == key_id) {
            let output = self.commit_output();
            return self.finish(OutcomeStatus::Expected(key_id.to_string()), output, None);
        }
        match self.keybindings.resolve(key_id) {
            Some(action) => self.apply(action),
            None if key_id == "space" => self.insert_text(" "),
            None if key_id.chars().count() == 1 => self.insert_text(key_id),
            None => Step::Unchanged,
        }
    }

    fn apply(&mut self, action: MenuAction) -> Step {
        use MenuAction::*;

        match action {
            CursorLeft => self.left(),
            CursorRight => self.right(),
            CursorWordLeft => self.move_word(Direction::Backward),
            CursorWordRight => self.move_word(Direction::Forward),
            Home => self.home(),
            End => self.end(),
            SelectUp => Step::redraw_if(self.select_up()),
            SelectDown => Step::redraw_if(self.select_down()),
            PageUp => Step::redraw_if(self.page_up()),
            PageDown => Step::redraw_if(self.page_down()),
            DeleteCharBackward => {
                let changed = self.buffer.delete_backward();
                self.edited(changed)
            }
            DeleteCharForward => {
                let changed = self.buffer.delete_forward();
                self.edited(changed)
            }
            DeleteWordBackward => {
                let changed = self.buffer.delete_word_backward();
                self.edited(changed)
            }
            DeleteToLineStart => {
                let changed = self.buffer.delete_to_start();
                self.edited(changed)
            }
            Complete => self.complete(),
            Accept => {
                let output = self.commit_output();
                let record = self.history_text();
                self.finish(OutcomeStatus::Accepted, output, Some(record))
            }
            AcceptInput => {
                let raw = self.query();
                self.finish(OutcomeStatus::AcceptedInput, vec![raw.clone()], Some(raw))
            }
            ToggleChosen => match self.selection.current_id(&self.matches) {
                Some(id) => {
                    let chosen = self.selection.toggle(id);
                    debug!(id, chosen, "toggled item");
                    Step::Redraw
                }
                None => Step::Unchanged,
            },
            Cancel => self.finish(OutcomeStatus::Cancelled, Vec::new(), None),
            PastePrimary => Step::Paste(PasteSelection::Primary),
            PasteClipboard => Step::Paste(PasteSelection::Clipboard),
            HistoryOlder => self.navigate_history(HistoryDirection::Older),
            HistoryNewer => self.navigate_history(HistoryDirection::Newer),
        }
    }

    fn insert_text(&mut self, text: &str) -> Step {
        let printable: String = text.chars().filter(|ch| !ch.is_control()).collect();
        if printable.is_empty() {
            return Step::Unchanged;
        }
        match self.buffer.insert_str(&printable) {
            Ok(()) => self.rematch(),
            Err(err) => {
                debug!(%err, "insert ignored");
                Step::Unchanged
            }
        }
    }

    fn paste(&mut self, bytes: &[u8]) -> Step {
        if matches!(bytes.first(), None | Some(b'\n')) {
            return Step::Unchanged;
        }
        match self.buffer.insert_first_line(bytes) {
            Ok(()) => self.rematch(),
            Err(err) => {
                debug!(%err, "paste ignored");
                Step::Unchanged
            }
        }
    }

    fn edited(&mut self, changed: bool) -> Step {
        if changed {
            self.rematch()
        } else {
            Step::Unchanged
        }
    }

    fn move_word(&mut self, direction: Direction) -> Step {
        let before = self.buffer.cursor();
        self.buffer.move_word(direction);
        Step::redraw_if(self.buffer.cursor() != before)
    }

    fn navigate_history(&mut self, direction: HistoryDirection) -> Step {
        let current = self.query();
        let Some(text) = self
            .history
            .navigate(direction, &current)
            .map(str::to_owned)
        else {
            return Step::Unchanged;
        };
        self.buffer.set_text(text.as_bytes());
        self.rematch()
    }

    /// Rebuilds the match list for the current query and checks for instant accept.
    fn rematch(&mut self) -> Step {
        let query = self.query();
        if let Some(source) = self.dynamic.as_mut() {
            let lines = source.refresh(&query);
            self.store = ItemStore::from_lines(lines, self.options.separator, &self.priority);
        }

        let bypass_filter = self.dynamic.is_some() && !self.options.fuzzy;
        let options = self.options.match_options(bypass_filter);
        self.matches = match_items(&self.store, &query, &options);
        self.selection.reset(self.matches.len());
        self.page = self.paginate_from(0);
        debug!(
            query_len = query.len(),
            matches = self.matches.len(),
            total = self.store.len(),
            "rematched"
        );

        if self.options.instant && !query.is_empty() && is_instant_candidate(&self.matches) {
            let output = self.commit_output();
            let record = self.history_text();
            return self.finish(OutcomeStatus::InstantAccepted, output, Some(record));
        }
        Step::Redraw
    }

    fn preselect(&mut self) {
        if self.state != EngineState::Editing {
            return;
        }
        for _ in 0..self.options.preselect {
            if !self.select_down() {
                break;
            }
        }
    }

    fn complete(&mut self) -> Step {
        let query = self.query();
        let Some(prefix) = self.common_prefix() else {
            return Step::Unchanged;
        };
        // Completion only ever extends the query.
        if prefix.len() < query.len() || (prefix == query && self.buffer.at_end()) {
            return Step::Unchanged;
        }
        self.buffer.set_text(prefix.as_bytes());
        self.rematch()
    }

    /// Longest common prefix of every matched display text, cut on a char boundary.
    fn common_prefix(&self) -> Option<String> {
        let mut displays = self
            .matches
            .ids()
            .filter_map(|id| self.store.get(id))
            .map(|item| item.display());
        let first = displays.next()?;
        let mut len = first.len();
        for other in displays {
            len = first.as_bytes()[..len]
                .iter()
                .zip(other.as_bytes())
                .take_while(|(a, b)| a == b)
                .count();
            if len == 0 {
                break;
            }
        }
        while !first.is_char_boundary(len) {
            len -= 1;
        }
        Some(first[..len].to_string())
    }

    fn commit_output(&self) -> Vec<String> {
        let raw = self.query();
        if self.options.password {
            return vec![raw];
        }
        self.selection
            .commit_output(&self.store, &self.matches, &raw, self.options.print_index)
    }

    fn history_text(&self) -> String {
        match self.selected_display() {
            Some(display) => display.to_string(),
            None => self.query(),
        }
    }

    fn finish(&mut self, status: OutcomeStatus, output: Vec<String>, record: Option<String>) -> Step {
        if let Some(text) = record.filter(|_| !self.options.password) {
            match self.history.commit(&text) {
                Ok(changed) => debug!(changed, "history recorded"),
                Err(err) => warn!(%err, "failed to save history"),
            }
        }
        info!(?status, outputs = output.len(), "menu session finished");
        let outcome = Outcome { status, output };
        self.state = EngineState::Terminated;
        self.outcome = Some(outcome.clone());
        Step::Finished(outcome)
    }

    fn layout(&self) -> Layout {
        if self.options.lines > 0 {
            Layout::Fixed {
                rows: self.options.lines,
                columns: self.options.columns.max(1),
            }
        } else {
            Layout::Measured {
                budget: self.strip_budget(),
            }
        }
    }

    /// Strip width left for items after the prompt, the input field (a third of the strip),
    /// both arrows and the counter.
    fn strip_budget(&self) -> usize {
        let total = self.strip_width;
        let measure = self.measure.as_ref();
        let prompt = self
            .options
            .prompt
            .as_deref()
            .map_or(0, |prompt| measure.width(prompt, total));
        let reserved = prompt
            + total / 3
            + measure.width("<", total)
            + measure.width(">", total)
            + measure.width(&self.counter(), total);
        total.saturating_sub(reserved)
    }

    fn item_width(&self, position: usize, budget: usize) -> usize {
        self.matches
            .id_at(position)
            .and_then(|id| self.store.get(id))
            .map_or(0, |item| self.measure.width(item.display(), budget))
    }

    fn paginate_from(&self, start: usize) -> Page {
        let layout = self.layout();
        let budget = match layout {
            Layout::Measured { budget } => budget,
            Layout::Fixed { .. } => 0,
        };
        paginate(layout, self.matches.len(), start, |position| {
            self.item_width(position, budget)
        })
    }

    fn page_for(&self, target: usize) -> Page {
        let layout = self.layout();
        let budget = match layout {
            Layout::Measured { budget } => budget,
            Layout::Fixed { .. } => 0,
        };
        page_containing(layout, self.matches.len(), target, |position| {
            self.item_width(position, budget)
        })
    }

    fn reanchor(&mut self) {
        self.page = self.page_for(self.selection.current().unwrap_or(0));
    }

    /// Moves the page so that `target` is visible, preferring the neighbouring page.
    fn reveal(&mut self, target: usize) {
        if self.page.contains(target) {
            return;
        }
        let neighbour = if target < self.page.start {
            self.paginate_from(self.page.prev_start)
        } else {
            self.paginate_from(self.page.end)
        };
        self.page = if neighbour.contains(target) {
            neighbour
        } else {
            self.page_for(target)
        };
    }

    fn select_by(&mut self, delta: isize) -> bool {
        if !self.selection.step(delta, self.matches.len()) {
            return false;
        }
        if let Some(current) = self.selection.current() {
            self.reveal(current);
        }
        true
    }

    fn select_up(&mut self) -> bool {
        self.select_by(-1)
    }

    fn select_down(&mut self) -> bool {
        self.select_by(1)
    }

    fn page_down(&mut self) -> bool {
        let len = self.matches.len();
        if !self.page.has_next(len) {
            return false;
        }
        self.page = self.paginate_from(self.page.end);
        self.selection.set_current(self.page.start, len)
    }

    fn page_up(&mut self) -> bool {
        if !self.page.has_prev() {
            return false;
        }
        self.page = self.paginate_from(self.page.prev_start);
        self.selection.set_current(self.page.start, self.matches.len())
    }

    fn home(&mut self) -> Step {
        if matches!(self.selection.current(), None | Some(0)) {
            let moved = self.buffer.cursor() != 0;
            self.buffer.move_to_start();
            return Step::redraw_if(moved);
        }
        self.page = self.paginate_from(0);
        Step::redraw_if(self.selection.set_current(0, self.matches.len()))
    }

    fn end(&mut self) -> Step {
        if !self.buffer.at_end() {
            self.buffer.move_to_end();
            return Step::Redraw;
        }
        let len = self.matches.len();
        if len == 0 || self.selection.current() == Some(len - 1) {
            return Step::Unchanged;
        }
        self.page = self.page_for(len - 1);
        Step::redraw_if(self.selection.set_current(len - 1, len))
    }

    fn left(&mut self) -> Step {
        if self.options.is_grid() {
            return Step::redraw_if(self.column_step(false));
        }
        let at_head = matches!(self.selection.current(), None | Some(0));
        if self.buffer.cursor() > 0 && (at_head || self.options.lines > 0) {
            self.buffer.move_cursor(Direction::Backward);
            return Step::Redraw;
        }
        if self.options.lines > 0 {
            return Step::Unchanged;
        }
        Step::redraw_if(self.select_up())
    }

    fn right(&mut self) -> Step {
        if self.options.is_grid() {
            return Step::redraw_if(self.column_step(true));
        }
        if !self.buffer.at_end() {
            self.buffer.move_cursor(Direction::Forward);
            return Step::Redraw;
        }
        if self.options.lines > 0 {
            return Step::Unchanged;
        }
        Step::redraw_if(self.select_down())
    }

    /// Moves one grid column (`lines` items). A move that would run off either end of the
    /// list leaves the selection where it is.
    fn column_step(&mut self, forward: bool) -> bool {
        let Some(current) = self.selection.current() else {
            return false;
        };
        let rows = self.options.lines;
        let len = self.matches.len();
        let target = if forward {
            if current + rows >= len {
                return false;
            }
            current + rows
        } else {
            if current < rows {
                return false;
            }
            current - rows
        };
        self.selection.set_current(target, len);
        self.reveal(target);
        true
    }

    /// Width of `text` by the measure, without the padding the measure adds to every string.
    fn text_width(&self, text: &str) -> usize {
        let measure = self.measure.as_ref();
        measure
            .width(text, usize::MAX)
            .saturating_sub(measure.width("", usize::MAX))
    }

    pub fn view(&self) -> MenuView {
        let (input, cursor, cursor_column) = if self.options.password {
            let masked: String = std::iter::repeat(PASSWORD_MASK)
                .take(self.buffer.len())
                .collect();
            let column = self.text_width(&masked[..self.buffer.cursor()]);
            (masked, self.buffer.cursor(), column)
        } else {
            let before = String::from_utf8_lossy(&self.buffer.as_bytes()[..self.buffer.cursor()]);
            (self.query(), before.len(), self.text_width(&before))
        };

        let query = self.query();
        let match_options = self.options.match_options(false);
        let current = self.selection.current();
        let items = (self.page.start..self.page.end)
            .filter_map(|position| {
                let id = self.matches.id_at(position)?;
                let item = self.store.get(id)?;
                Some(ViewItem {
                    id,
                    position,
                    display: item.display().to_string(),
                    selected: current == Some(position),
                    chosen: self.selection.is_chosen(id),
                    highlights: highlight_ranges(item.display(), &query, &match_options),
                })
            })
            .collect();

        MenuView {
            prompt: self.options.prompt.clone(),
            input,
            cursor,
            cursor_column,
            items,
            layout: self.layout(),
            has_prev: self.page.has_prev(),
            has_next: self.page.has_next(self.matches.len()),
            counter: self.counter(),
            state: self.state,
        }
    }
}
