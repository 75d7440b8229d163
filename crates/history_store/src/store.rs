use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::HistoryError;

/// Direction of history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward older entries.
    Older,
    /// Toward newer entries, ending at the draft that was live before navigation started.
    Newer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Number of entries kept when the log is saved. Zero disables recording.
    pub max_entries: usize,
    /// When set, recording an entry that already exists moves it to the newest position.
    pub dedup: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_entries: 50,
            dedup: true,
        }
    }
}

pub struct HistoryStore {
    path: Option<PathBuf>,
    entries: Vec<String>,
    options: HistoryOptions,
    /// `entries.len()` means "past the newest entry", i.e. editing the draft.
    position: usize,
    draft: String,
    skipped_lines: usize,
}

impl HistoryStore {
    /// A store with no backing file; `save` is a no-op.
    #[must_use]
    pub fn in_memory(options: HistoryOptions) -> Self {
        Self::from_entries(None, Vec::new(), options)
    }

    fn from_entries(path: Option<PathBuf>, entries: Vec<String>, options: HistoryOptions) -> Self {
        let position = entries.len();
        Self {
            path,
            entries,
            options,
            position,
            draft: String::new(),
            skipped_lines: 0,
        }
    }

    /// Reads the whole log at `path`.
    ///
    /// A missing file is an empty history. Lines that are not valid UTF-8 are skipped.
    pub fn load(path: &Path, options: HistoryOptions) -> Result<Self, HistoryError> {
        let path = path.to_path_buf();
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "history file missing; starting empty");
                return Ok(Self::from_entries(Some(path), Vec::new(), options));
            }
            Err(source) => return Err(HistoryError::io("reading history file", &path, source)),
        };

        let mut entries = Vec::new();
        let mut skipped_lines = 0usize;
        for (line_index, line) in raw.split(|byte| *byte == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            match std::str::from_utf8(line) {
                Ok(text) => entries.push(text.to_string()),
                Err(_) => {
                    skipped_lines += 1;
                    warn!(
                        path = %path.display(),
                        line = line_index + 1,
                        "skipping malformed history entry"
                    );
                }
            }
        }

        debug!(path = %path.display(), entries = entries.len(), "loaded history");
        let mut store = Self::from_entries(Some(path), entries, options);
        store.skipped_lines = skipped_lines;
        Ok(store)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn options(&self) -> HistoryOptions {
        self.options
    }

    /// Index of the entry currently shown, or `len()` when back at the draft.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of lines dropped during `load` because they were not valid UTF-8.
    #[must_use]
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Moves the navigation cursor and returns the text that should replace the live query.
    ///
    /// `current` is remembered as the draft when navigation leaves the draft position, and is
    /// handed back when navigating newer past the most recent entry. Returns `None` at either end.
    pub fn navigate(&mut self, direction: Direction, current: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }

        if self.position == self.entries.len() {
            self.draft = current.to_string();
        }

        match direction {
            Direction::Older => {
                if self.position == 0 {
                    return None;
                }
                self.position -= 1;
                Some(self.entries[self.position].as_str())
            }
            Direction::Newer => {
                if self.position + 1 < self.entries.len() {
                    self.position += 1;
                    Some(self.entries[self.position].as_str())
                } else if self.position + 1 == self.entries.len() {
                    self.position = self.entries.len();
                    Some(self.draft.as_str())
                } else {
                    None
                }
            }
        }
    }

    /// Records a committed query. Returns whether the in-memory log changed.
    ///
    /// Only the first line of `text` is kept. Empty text is ignored; without dedup an entry equal
    /// to the most recent one is not appended again.
    pub fn record(&mut self, text: &str) -> bool {
        let text = text.split(['\n', '\r']).next().unwrap_or_default();
        if text.is_empty() || self.options.max_entries == 0 {
            return false;
        }

        let changed = if self.options.dedup {
            match self.entries.iter().position(|entry| entry == text) {
                Some(index) if index + 1 == self.entries.len() => false,
                Some(index) => {
                    let entry = self.entries.remove(index);
                    self.entries.push(entry);
                    true
                }
                None => {
                    self.entries.push(text.to_string());
                    true
                }
            }
        } else if self.entries.last().is_some_and(|last| last == text) {
            false
        } else {
            self.entries.push(text.to_string());
            true
        };

        self.position = self.entries.len();
        self.draft.clear();
        changed
    }

    /// Entries that `save` writes: the most recent `max_entries`, oldest first.
    #[must_use]
    pub fn retained(&self) -> &[String] {
        let start = self.entries.len().saturating_sub(self.options.max_entries);
        &self.entries[start..]
    }

    /// Rewrites the backing log with the retained entries.
    pub fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if self.options.max_entries == 0 {
            return Ok(());
        }

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| HistoryError::io("creating history directory", parent, source))?;
        }

        let mut encoded = String::new();
        for entry in self.retained() {
            encoded.push_str(entry);
            encoded.push('\n');
        }
        fs::write(path, encoded)
            .map_err(|source| HistoryError::io("writing history file", path, source))?;
        debug!(path = %path.display(), entries = self.retained().len(), "saved history");
        Ok(())
    }

    /// Records `text` and saves the log when it changed.
    pub fn commit(&mut self, text: &str) -> Result<bool, HistoryError> {
        let changed = self.record(text);
        if changed {
            self.save()?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, HistoryOptions, HistoryStore};

    fn store_with(entries: &[&str], dedup: bool) -> HistoryStore {
        let mut store = HistoryStore::in_memory(HistoryOptions {
            max_entries: 50,
            dedup,
        });
        for entry in entries {
            store.record(entry);
        }
        store
    }

    #[test]
    fn navigation_walks_back_and_restores_draft() {
        let mut store = store_with(&["one", "two", "three"], true);

        assert_eq!(store.navigate(Direction::Older, "dra"), Some("three"));
        assert_eq!(store.navigate(Direction::Older, "three"), Some("two"));
        assert_eq!(store.navigate(Direction::Older, "two"), Some("one"));
        assert_eq!(store.navigate(Direction::Older, "one"), None);
        assert_eq!(store.position(), 0);

        assert_eq!(store.navigate(Direction::Newer, "one"), Some("two"));
        assert_eq!(store.navigate(Direction::Newer, "two"), Some("three"));
        assert_eq!(store.navigate(Direction::Newer, "three"), Some("dra"));
        assert_eq!(store.navigate(Direction::Newer, "dra"), None);
    }

    #[test]
    fn navigation_on_empty_history_is_noop() {
        let mut store = store_with(&[], true);
        assert_eq!(store.navigate(Direction::Older, "x"), None);
        assert_eq!(store.navigate(Direction::Newer, "x"), None);
    }

    #[test]
    fn dedup_moves_existing_entry_to_newest() {
        let mut store = store_with(&["a", "b", "c"], true);
        assert!(store.record("a"));
        assert_eq!(store.entries(), ["b", "c", "a"]);
        assert!(!store.record("a"));
        assert_eq!(store.entries().iter().filter(|e| *e == "a").count(), 1);
    }

    #[test]
    fn without_dedup_only_consecutive_repeats_are_dropped() {
        let mut store = store_with(&["a", "b"], false);
        assert!(!store.record("b"));
        assert!(store.record("a"));
        assert_eq!(store.entries(), ["a", "b", "a"]);
    }

    #[test]
    fn empty_text_and_zero_cap_are_ignored() {
        let mut store = store_with(&[], true);
        assert!(!store.record(""));
        assert!(!store.record("\nsecond"));

        let mut disabled = HistoryStore::in_memory(HistoryOptions {
            max_entries: 0,
            dedup: true,
        });
        assert!(!disabled.record("text"));
        assert!(disabled.is_empty());
    }

    #[test]
    fn retained_keeps_most_recent_entries() {
        let mut store = HistoryStore::in_memory(HistoryOptions {
            max_entries: 2,
            dedup: false,
        });
        for entry in ["a", "b", "c"] {
            store.record(entry);
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.retained(), ["b", "c"]);
    }
}
