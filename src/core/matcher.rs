//! Query matching and ranking.
//!
//! Every query change rescans the whole [`ItemStore`] and rebuilds the [`MatchList`] from
//! scratch; nothing is maintained incrementally.

use std::ops::Range;

use crate::core::fuzzy::{fuzzy_match, fuzzy_positions};
use crate::core::item::ItemStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Fuzzy,
    Tiered,
}

/// Ranking bucket in tiered mode, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// The whole query is a prefix of the item (or equals it when substring matching is on).
    Exact,
    PriorityPrefix,
    Prefix,
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub mode: MatchMode,
    /// Drop items whose first token only matches as a substring.
    pub prefix_only: bool,
    pub case_sensitive: bool,
    pub sort: bool,
    /// Candidates were already filtered by a dynamic source: rank them, never drop them.
    pub bypass_filter: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Fuzzy,
            prefix_only: true,
            case_sensitive: false,
            sort: true,
            bypass_filter: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchEntry {
    /// Item id in the store.
    pub id: usize,
    /// Tier in sorted tiered mode; `None` for fuzzy or unsorted matches.
    pub tier: Option<Tier>,
    /// Fuzzy distance (lower is better); zero in tiered mode.
    pub score: f64,
}

/// Ordered references into the item store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchList {
    entries: Vec<MatchEntry>,
}

impl MatchList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&MatchEntry> {
        self.entries.get(position)
    }

    /// Item id at `position`.
    pub fn id_at(&self, position: usize) -> Option<usize> {
        self.entries.get(position).map(|entry| entry.id)
    }

    pub fn position_of(&self, id: usize) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Position one past the last entry.
    pub fn tail(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }
}

pub fn tokenize(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

fn starts_with(text: &str, prefix: &str, case_sensitive: bool) -> bool {
    let (text, prefix) = (text.as_bytes(), prefix.as_bytes());
    if prefix.len() > text.len() {
        return false;
    }
    let head = &text[..prefix.len()];
    if case_sensitive {
        head == prefix
    } else {
        head.eq_ignore_ascii_case(prefix)
    }
}

fn find(text: &str, needle: &str, case_sensitive: bool) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let (text, needle) = (text.as_bytes(), needle.as_bytes());
    text.windows(needle.len()).position(|window| {
        if case_sensitive {
            window == needle
        } else {
            window.eq_ignore_ascii_case(needle)
        }
    })
}

fn equals(text: &str, other: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        text == other
    } else {
        text.eq_ignore_ascii_case(other)
    }
}

pub fn match_items(store: &ItemStore, query: &str, options: &MatchOptions) -> MatchList {
    let entries = match options.mode {
        MatchMode::Fuzzy => fuzzy_entries(store, query, options),
        MatchMode::Tiered => tiered_entries(store, query, options),
    };
    MatchList { entries }
}

fn fuzzy_entries(store: &ItemStore, query: &str, options: &MatchOptions) -> Vec<MatchEntry> {
    let tokens = tokenize(query);
    let mut entries: Vec<MatchEntry> = store
        .iter()
        .filter_map(|item| {
            let mut score = 0.0f64;
            for token in &tokens {
                let matched = fuzzy_match(token, item.display(), options.case_sensitive);
                if !matched.matches {
                    return None;
                }
                score += matched.score;
            }
            Some(MatchEntry {
                id: item.id(),
                tier: None,
                score,
            })
        })
        .collect();

    if options.sort {
        // Stable: equal distances keep load order.
        entries.sort_by(|a, b| a.score.total_cmp(&b.score));
    }
    entries
}

fn tiered_entries(store: &ItemStore, query: &str, options: &MatchOptions) -> Vec<MatchEntry> {
    let tokens = tokenize(query);
    let case_sensitive = options.case_sensitive;
    let mut buckets: [Vec<MatchEntry>; 4] = Default::default();

    for item in store.iter() {
        let text = item.display();
        let all_tokens = tokens
            .iter()
            .all(|token| find(text, token, case_sensitive).is_some());
        if !all_tokens && !options.bypass_filter {
            continue;
        }

        let tier = if !options.sort {
            None
        } else if tokens.is_empty()
            || (options.prefix_only && starts_with(text, query, case_sensitive))
            || (!options.prefix_only && equals(text, query, case_sensitive))
        {
            Some(Tier::Exact)
        } else if starts_with(text, tokens[0], case_sensitive) {
            if item.is_priority() {
                Some(Tier::PriorityPrefix)
            } else {
                Some(Tier::Prefix)
            }
        } else if !options.prefix_only || options.bypass_filter {
            Some(Tier::Substring)
        } else {
            continue;
        };

        let bucket = match tier {
            None | Some(Tier::Exact) => 0,
            Some(Tier::PriorityPrefix) => 1,
            Some(Tier::Prefix) => 2,
            Some(Tier::Substring) => 3,
        };
        buckets[bucket].push(MatchEntry {
            id: item.id(),
            tier,
            score: 0.0,
        });
    }

    buckets.into_iter().flatten().collect()
}

/// Whether this result should commit immediately when instant-accept is on: exactly one match,
/// and in tiered mode that match is not a bare substring hit.
pub fn is_instant_candidate(list: &MatchList) -> bool {
    list.len() == 1 && list.get(0).is_some_and(|entry| entry.tier != Some(Tier::Substring))
}

/// Byte ranges of `text` that the query matched, sorted and merged.
pub fn highlight_ranges(text: &str, query: &str, options: &MatchOptions) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for token in tokenize(query) {
        match options.mode {
            MatchMode::Fuzzy => {
                if let Some(positions) = fuzzy_positions(token, text, options.case_sensitive) {
                    for offset in positions {
                        let width = text[offset..].chars().next().map_or(1, char::len_utf8);
                        ranges.push(offset..offset + width);
                    }
                }
            }
            MatchMode::Tiered => {
                if let Some(start) = find(text, token, options.case_sensitive) {
                    ranges.push(start..start + token.len());
                }
            }
        }
    }

    ranges.sort_by_key(|range| range.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
