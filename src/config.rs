//! Environment configuration and menu options.

use std::env;
use std::path::PathBuf;

use history_store::{expand_home, HISTORY_FILE_NAME};

use crate::core::buffer::{DEFAULT_CAPACITY, DEFAULT_WORD_DELIMITERS};
use crate::core::input_event::{normalize_key_id, KeyId};
use crate::core::item::{PrioritySet, Separator};
use crate::core::matcher::{MatchMode, MatchOptions};

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub write_log: Option<String>,
    pub debug: bool,
    pub history_file: Option<String>,
    pub case_sensitive: bool,
    pub home: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt("TAPE_MENU_WRITE_LOG"),
            debug: env_flag("TAPE_MENU_DEBUG"),
            history_file: env_string_opt("TAPE_MENU_HISTFILE"),
            case_sensitive: env_flag("TAPE_MENU_CASE_SENSITIVE"),
            home: env_string_opt("HOME").map(PathBuf::from),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

/// Session options for [`crate::MenuEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct MenuOptions {
    pub fuzzy: bool,
    /// Commit as soon as a non-empty query leaves exactly one match.
    pub instant: bool,
    /// Rows of the vertical list; zero selects the horizontal strip.
    pub lines: usize,
    /// Grid columns; zero or one means a plain list.
    pub columns: usize,
    pub max_history: usize,
    pub history_dedup: bool,
    pub history_path: Option<PathBuf>,
    pub word_delimiters: String,
    pub prefix_only: bool,
    pub case_sensitive: bool,
    pub sort: bool,
    pub prompt: Option<String>,
    pub separator: Option<Separator>,
    pub password: bool,
    pub print_index: bool,
    /// Number of items to move down from the head after the first match.
    pub preselect: usize,
    pub initial_text: Option<String>,
    pub expect_keys: Vec<KeyId>,
    pub priority_items: Vec<String>,
    pub buffer_capacity: usize,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            instant: false,
            lines: 15,
            columns: 0,
            max_history: 50,
            history_dedup: true,
            history_path: None,
            word_delimiters: DEFAULT_WORD_DELIMITERS.to_string(),
            prefix_only: true,
            case_sensitive: false,
            sort: true,
            prompt: None,
            separator: None,
            password: false,
            print_index: false,
            preselect: 0,
            initial_text: None,
            expect_keys: Vec::new(),
            priority_items: Vec::new(),
            buffer_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl MenuOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }

    pub fn lines(mut self, lines: usize) -> Self {
        self.lines = lines;
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn history_dedup(mut self, dedup: bool) -> Self {
        self.history_dedup = dedup;
        self
    }

    pub fn history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    /// Keeps history in the standard file name inside `dir`.
    pub fn history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_path = Some(dir.into().join(HISTORY_FILE_NAME));
        self
    }

    pub fn word_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.word_delimiters = delimiters.into();
        self
    }

    pub fn prefix_only(mut self, prefix_only: bool) -> Self {
        self.prefix_only = prefix_only;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn separator(mut self, separator: Separator) -> Self {
        self.separator = Some(separator);
        self
    }

    pub fn password(mut self, password: bool) -> Self {
        self.password = password;
        self
    }

    pub fn print_index(mut self, print_index: bool) -> Self {
        self.print_index = print_index;
        self
    }

    pub fn preselect(mut self, preselect: usize) -> Self {
        self.preselect = preselect;
        self
    }

    pub fn initial_text(mut self, text: impl Into<String>) -> Self {
        self.initial_text = Some(text.into());
        self
    }

    /// Keys that end the session with [`crate::OutcomeStatus::Expected`].
    pub fn expect_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expect_keys = keys
            .into_iter()
            .map(|key| normalize_key_id(key.as_ref()))
            .collect();
        self
    }

    pub fn priority_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Overlays values set in the environment. A leading `~` in the history path expands to
    /// `HOME`.
    pub fn apply_env(mut self, env: &EnvConfig) -> Self {
        if let Some(path) = env.history_file.as_deref() {
            self.history_path = Some(expand_home(path, env.home.as_deref()));
        }
        if env.case_sensitive {
            self.case_sensitive = true;
        }
        self
    }

    /// A grid needs at least one row.
    pub fn validate(mut self) -> Self {
        if self.columns > 0 && self.lines == 0 {
            self.lines = 1;
        }
        self
    }

    pub fn match_options(&self, bypass_filter: bool) -> MatchOptions {
        MatchOptions {
            mode: if self.fuzzy {
                MatchMode::Fuzzy
            } else {
                MatchMode::Tiered
            },
            prefix_only: self.prefix_only,
            case_sensitive: self.case_sensitive,
            sort: self.sort,
            bypass_filter,
        }
    }

    pub fn priority_set(&self) -> PrioritySet {
        PrioritySet::new(self.priority_items.iter().cloned())
    }

    /// Whether Left/Right move between grid columns.
    pub fn is_grid(&self) -> bool {
        self.lines > 0 && self.columns > 1
    }
}

#[cfg(test)]
mod tests {
    use super::{EnvConfig, MenuOptions};
    use crate::core::matcher::MatchMode;
    use std::env;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_are_unset() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_MENU_WRITE_LOG", None);
        let _g2 = set_env_guard("TAPE_MENU_DEBUG", None);
        let _g3 = set_env_guard("TAPE_MENU_HISTFILE", None);
        let _g4 = set_env_guard("TAPE_MENU_CASE_SENSITIVE", None);

        let config = EnvConfig::from_env();
        assert!(config.write_log.is_none());
        assert!(!config.debug);
        assert!(config.history_file.is_none());
        assert!(!config.case_sensitive);
    }

    #[test]
    fn env_values_are_read() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_MENU_WRITE_LOG", Some("/tmp/tape_menu.log"));
        let _g2 = set_env_guard("TAPE_MENU_DEBUG", Some("1"));
        let _g3 = set_env_guard("TAPE_MENU_HISTFILE", Some("/tmp/history"));
        let _g4 = set_env_guard("TAPE_MENU_CASE_SENSITIVE", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.write_log.as_deref(), Some("/tmp/tape_menu.log"));
        assert!(config.debug);
        assert_eq!(config.history_file.as_deref(), Some("/tmp/history"));
        assert!(config.case_sensitive);
    }

    #[test]
    fn empty_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_MENU_WRITE_LOG", Some(""));
        let _g2 = set_env_guard("TAPE_MENU_DEBUG", Some("yes"));
        let config = EnvConfig::from_env();
        assert!(config.write_log.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn defaults_follow_shipped_configuration() {
        let options = MenuOptions::default();
        assert!(options.fuzzy);
        assert!(!options.instant);
        assert_eq!(options.lines, 15);
        assert_eq!(options.columns, 0);
        assert_eq!(options.max_history, 50);
        assert!(options.history_dedup);
        assert_eq!(options.word_delimiters, " ");
        assert!(options.prefix_only);
        assert_eq!(options.buffer_capacity, 8191);
        assert_eq!(options.match_options(false).mode, MatchMode::Fuzzy);
    }

    #[test]
    fn history_file_expands_home() {
        let env = EnvConfig {
            history_file: Some("~/.cache/tape_menu/history".to_string()),
            home: Some(PathBuf::from("/home/menu")),
            ..EnvConfig::default()
        };
        let options = MenuOptions::new().apply_env(&env);
        assert_eq!(
            options.history_path,
            Some(PathBuf::from("/home/menu/.cache/tape_menu/history"))
        );
        let options = MenuOptions::new().history_dir("/var/lib/menu");
        assert_eq!(options.history_path, Some(PathBuf::from("/var/lib/menu/history")));
    }

    #[test]
    fn env_overlay_and_validation() {
        let env = EnvConfig {
            history_file: Some("/tmp/menu_history".to_string()),
            case_sensitive: true,
            ..EnvConfig::default()
        };
        let options = MenuOptions::new()
            .lines(0)
            .columns(3)
            .expect_keys(["Ctrl+Shift+K"])
            .apply_env(&env)
            .validate();
        assert_eq!(options.lines, 1);
        assert!(options.is_grid());
        assert!(options.case_sensitive);
        assert_eq!(options.history_path, Some(PathBuf::from("/tmp/menu_history")));
        assert_eq!(options.expect_keys, vec!["ctrl+shift+k".to_string()]);
    }
}
