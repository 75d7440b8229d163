//! Menu keybindings.
//!
//! Each normalized key id resolves to at most one [`MenuAction`]. Overrides replace the full key
//! list of an action; a key claimed by an override is removed from every other action.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::input_event::{normalize_key_id, KeyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MenuAction {
    CursorLeft,
    CursorRight,
    CursorWordLeft,
    CursorWordRight,
    Home,
    End,
    SelectUp,
    SelectDown,
    PageUp,
    PageDown,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    Complete,
    Accept,
    AcceptInput,
    ToggleChosen,
    Cancel,
    PastePrimary,
    PasteClipboard,
    HistoryOlder,
    HistoryNewer,
}

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<String> for KeyBinding {
    fn from(value: String) -> Self {
        KeyBinding::Single(value)
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(|item| item.to_string()).collect())
    }
}

impl From<Vec<String>> for KeyBinding {
    fn from(value: Vec<String>) -> Self {
        KeyBinding::Multiple(value)
    }
}

impl KeyBinding {
    fn keys(&self) -> Vec<KeyId> {
        match self {
            KeyBinding::Single(key) => vec![normalize_key_id(key)],
            KeyBinding::Multiple(keys) => keys.iter().map(|key| normalize_key_id(key)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuKeybindingsConfig {
    entries: HashMap<MenuAction, KeyBinding>,
}

impl MenuKeybindingsConfig {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: MenuAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

fn keys(ids: &[&str]) -> Vec<KeyId> {
    ids.iter().map(|id| id.to_string()).collect()
}

pub static DEFAULT_MENU_KEYBINDINGS: LazyLock<HashMap<MenuAction, Vec<KeyId>>> =
    LazyLock::new(|| {
        use MenuAction::*;

        let mut map = HashMap::new();
        map.insert(CursorLeft, keys(&["left", "ctrl+b"]));
        map.insert(CursorRight, keys(&["right", "ctrl+f"]));
        map.insert(CursorWordLeft, keys(&["ctrl+left", "alt+b"]));
        map.insert(CursorWordRight, keys(&["ctrl+right", "alt+f"]));
        map.insert(Home, keys(&["home", "ctrl+a", "alt+g"]));
        map.insert(End, keys(&["end", "ctrl+e", "alt+shift+g"]));
        map.insert(SelectUp, keys(&["up", "ctrl+p", "ctrl+k", "alt+h"]));
        map.insert(SelectDown, keys(&["down", "ctrl+n", "ctrl+j", "alt+l"]));
        map.insert(PageUp, keys(&["pageup", "alt+k"]));
        map.insert(PageDown, keys(&["pagedown", "alt+j"]));
        map.insert(DeleteCharBackward, keys(&["backspace", "ctrl+h"]));
        map.insert(DeleteCharForward, keys(&["delete", "ctrl+d"]));
        map.insert(DeleteWordBackward, keys(&["ctrl+w", "ctrl+backspace"]));
        map.insert(DeleteToLineStart, keys(&["ctrl+u"]));
        map.insert(Complete, keys(&["tab", "ctrl+i"]));
        map.insert(Accept, keys(&["enter", "ctrl+m"]));
        map.insert(AcceptInput, keys(&["shift+enter", "shift+ctrl+m"]));
        map.insert(ToggleChosen, keys(&["ctrl+enter"]));
        map.insert(Cancel, keys(&["escape", "ctrl+c", "ctrl+g", "ctrl+["]));
        map.insert(PastePrimary, keys(&["ctrl+y", "ctrl+v"]));
        map.insert(PasteClipboard, keys(&["ctrl+shift+y", "ctrl+shift+v"]));
        map.insert(HistoryOlder, keys(&["alt+p"]));
        map.insert(HistoryNewer, keys(&["alt+n"]));

        map
    });

#[derive(Debug, Clone)]
pub struct MenuKeybindingsManager {
    action_to_keys: HashMap<MenuAction, Vec<KeyId>>,
    key_to_action: HashMap<KeyId, MenuAction>,
}

impl Default for MenuKeybindingsManager {
    fn default() -> Self {
        Self::new(MenuKeybindingsConfig::default())
    }
}

impl MenuKeybindingsManager {
    pub fn new(config: MenuKeybindingsConfig) -> Self {
        let mut manager = Self {
            action_to_keys: HashMap::new(),
            key_to_action: HashMap::new(),
        };
        manager.build_maps(&config);
        manager
    }

    fn build_maps(&mut self, config: &MenuKeybindingsConfig) {
        self.action_to_keys.clear();
        self.key_to_action.clear();

        for (action, keys) in DEFAULT_MENU_KEYBINDINGS.iter() {
            let keys = keys.iter().map(|key| normalize_key_id(key)).collect();
            self.action_to_keys.insert(*action, keys);
        }

        for (action, binding) in config.entries.iter() {
            let overridden = binding.keys();
            for keys in self.action_to_keys.values_mut() {
                keys.retain(|key| !overridden.contains(key));
            }
            self.action_to_keys.insert(*action, overridden);
        }

        for (action, keys) in self.action_to_keys.iter() {
            for key in keys {
                self.key_to_action.insert(key.clone(), *action);
            }
        }
    }

    /// Action bound to an already normalized key id.
    pub fn resolve(&self, key_id: &str) -> Option<MenuAction> {
        self.key_to_action.get(key_id).copied()
    }

    pub fn matches(&self, key_id: &str, action: MenuAction) -> bool {
        self.resolve(&normalize_key_id(key_id)) == Some(action)
    }

    pub fn get_keys(&self, action: MenuAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }

    pub fn set_config(&mut self, config: MenuKeybindingsConfig) {
        self.build_maps(&config);
    }
}
