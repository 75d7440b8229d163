//! Incremental filter-and-select engine for dmenu-style launchers.
//!
//! Invariant: single mutation gate — only [`MenuEngine::handle_event`] mutates the query buffer,
//! the selection or the history cursor.
//!
//! # Public API Overview
//! - Load candidates into an [`ItemStore`] and start a [`MenuEngine`] with [`MenuOptions`].
//! - Feed it [`InputEvent`]s; each returns a [`Step`], ending in an [`Outcome`].
//! - Draw from [`MenuEngine::view`], or let [`MenuList`] render plain text lines.
//! - Matching, pagination and selection are usable on their own through [`core`].

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod runtime;
pub mod widgets;

/// Configuration from the environment and per-session options.
pub use crate::config::{EnvConfig, MenuOptions};
/// Initialization errors.
pub use crate::error::MenuError;

/// Query buffer.
pub use crate::core::buffer::{BufferError, Direction, TextBuffer};
/// Collaborator hooks.
pub use crate::core::collaborators::{DynamicSource, PasteSelection};
/// Component trait implemented by widgets.
pub use crate::core::component::Component;
/// Fuzzy scoring.
pub use crate::core::fuzzy::{fuzzy_match, fuzzy_positions, FuzzyMatch};
/// Input events and key ids.
pub use crate::core::input_event::{key_id_from_byte, normalize_key_id, InputEvent, KeyId};
/// Candidates.
pub use crate::core::item::{Item, ItemStore, PrioritySet, Separator};
/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    KeyBinding, MenuAction, MenuKeybindingsConfig, MenuKeybindingsManager,
    DEFAULT_MENU_KEYBINDINGS,
};
/// Matching and ranking.
pub use crate::core::matcher::{
    highlight_ranges, is_instant_candidate, match_items, MatchEntry, MatchList, MatchMode,
    MatchOptions, Tier,
};
/// Width measurement.
pub use crate::core::measure::{CellMeasure, TextMeasure};
/// Page computation.
pub use crate::core::paginator::{page_containing, paginate, Layout, Page};
/// Selection and multi-select.
pub use crate::core::selection::Selection;
/// Cell width helpers.
pub use crate::core::text::width::{truncate_to_width, visible_width};

/// Session engine and its outputs.
pub use crate::runtime::engine::{
    EngineState, MenuEngine, MenuView, Outcome, OutcomeStatus, Step, ViewItem,
    DEFAULT_STRIP_WIDTH,
};
/// Text renderer.
pub use crate::widgets::{MenuList, MenuListTheme};

/// History log.
pub use history_store::{HistoryError, HistoryOptions, HistoryStore};
