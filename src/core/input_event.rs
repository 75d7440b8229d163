//! Discrete input events consumed by the engine.
//!
//! Acquiring keyboard input is the host's job; the host hands the engine key ids such as
//! `ctrl+shift+y`, typed text, or bytes it fetched for an earlier paste request.

/// Identifier of a key chord, normalized by [`normalize_key_id`].
pub type KeyId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { key_id: KeyId },
    Text { text: String },
    /// Bytes delivered by the clipboard collaborator; only the first line is inserted.
    Paste { bytes: Vec<u8> },
}

impl InputEvent {
    /// Key event with a normalized id.
    pub fn key(key_id: &str) -> Self {
        InputEvent::Key {
            key_id: normalize_key_id(key_id),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        InputEvent::Text { text: text.into() }
    }

    pub fn paste(bytes: impl Into<Vec<u8>>) -> Self {
        InputEvent::Paste {
            bytes: bytes.into(),
        }
    }
}

struct ParsedKeyId {
    key: String,
    ctrl: bool,
    alt: bool,
    shift: bool,
}

fn parse_key_id(key_id: &str) -> Option<ParsedKeyId> {
    let lowered = key_id.trim().to_lowercase();
    // `ctrl++` names the plus key itself.
    let (modifiers, key) = match lowered.strip_suffix("++") {
        Some(rest) => (rest, "+"),
        None => match lowered.rsplit_once('+') {
            Some((modifiers, key)) => (modifiers, key),
            None => ("", lowered.as_str()),
        },
    };
    if key.is_empty() {
        return None;
    }
    let parts: Vec<&str> = modifiers.split('+').collect();
    Some(ParsedKeyId {
        key: canonical_key_name(key).to_string(),
        ctrl: parts.iter().any(|part| *part == "ctrl"),
        alt: parts.iter().any(|part| matches!(*part, "alt" | "meta")),
        shift: parts.iter().any(|part| *part == "shift"),
    })
}

fn canonical_key_name(key: &str) -> &str {
    match key {
        "return" | "kp_enter" => "enter",
        "esc" => "escape",
        "del" => "delete",
        "bs" => "backspace",
        "prior" | "page_up" => "pageup",
        "next" | "page_down" => "pagedown",
        other => other,
    }
}

/// Lowercases the id, applies key-name aliases and orders modifiers as `ctrl+alt+shift+key`.
///
/// A bare single character keeps its case so it can be typed as-is. Ids that do not parse are
/// returned lowercased and otherwise untouched.
pub fn normalize_key_id(key_id: &str) -> KeyId {
    let trimmed = key_id.trim();
    let mut chars = trimmed.chars();
    if let (Some(_), None) = (chars.next(), chars.next()) {
        return trimmed.to_string();
    }
    let Some(parsed) = parse_key_id(key_id) else {
        return key_id.to_lowercase();
    };
    let mut normalized = String::new();
    if parsed.ctrl {
        normalized.push_str("ctrl+");
    }
    if parsed.alt {
        normalized.push_str("alt+");
    }
    if parsed.shift {
        normalized.push_str("shift+");
    }
    normalized.push_str(&parsed.key);
    normalized
}

/// Maps a single legacy terminal byte to a key id.
///
/// Returns `None` for printable bytes, which hosts should deliver as [`InputEvent::Text`].
pub fn key_id_from_byte(byte: u8) -> Option<KeyId> {
    let id = match byte {
        b'\r' | b'\n' => "enter".to_string(),
        b'\t' => "tab".to_string(),
        0x1b => "escape".to_string(),
        0x7f | 0x08 => "backspace".to_string(),
        1..=26 => format!("ctrl+{}", (byte + 96) as char),
        _ => return None,
    };
    Some(id)
}
