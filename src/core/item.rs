//! Item store: the candidates loaded once per session.

use std::collections::HashSet;
use std::io::BufRead;

use crate::error::MenuError;

/// One selectable candidate.
///
/// `id` is the load position; it identifies the item for multi-select and is what
/// index-printing mode emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    display: String,
    output: String,
    id: usize,
    priority: bool,
}

impl Item {
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_priority(&self) -> bool {
        self.priority
    }
}

/// How a raw line is split into display and output text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator {
    pub delimiter: char,
    /// Split at the last occurrence instead of the first.
    pub greedy: bool,
    /// Display the right-hand half and output the left-hand half.
    pub reverse: bool,
}

impl Separator {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            greedy: false,
            reverse: false,
        }
    }

    pub fn greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    fn split<'a>(&self, line: &'a str) -> (&'a str, &'a str) {
        let found = if self.greedy {
            line.rfind(self.delimiter)
        } else {
            line.find(self.delimiter)
        };
        let Some(at) = found else {
            return (line, line);
        };
        let left = &line[..at];
        let right = &line[at + self.delimiter.len_utf8()..];
        if self.reverse {
            (right, left)
        } else {
            (left, right)
        }
    }
}

/// Display texts that are tagged high priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrioritySet {
    entries: HashSet<String>,
}

impl PrioritySet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma-separated list, ignoring empty fields.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').filter(|entry| !entry.is_empty()))
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(text)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    pub fn from_lines<I, S>(lines: I, separator: Option<Separator>, priority: &PrioritySet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items = lines
            .into_iter()
            .enumerate()
            .map(|(id, line)| {
                let line = line.as_ref();
                let (display, output) = match separator {
                    Some(separator) => separator.split(line),
                    None => (line, line),
                };
                Item {
                    display: display.to_string(),
                    output: output.to_string(),
                    id,
                    priority: priority.contains(display),
                }
            })
            .collect();
        Self { items }
    }

    /// Reads newline-terminated lines. Invalid UTF-8 is decoded lossily rather than rejected.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        separator: Option<Separator>,
        priority: &PrioritySet,
    ) -> Result<Self, MenuError> {
        let mut lines = Vec::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let read = reader
                .read_until(b'\n', &mut raw)
                .map_err(|source| MenuError::resource("reading items", source))?;
            if read == 0 {
                break;
            }
            let line = raw.strip_suffix(b"\n").unwrap_or(&raw);
            lines.push(String::from_utf8_lossy(line).into_owned());
        }
        Ok(Self::from_lines(lines, separator, priority))
    }

    pub fn get(&self, id: usize) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }
}
