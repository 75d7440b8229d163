//! Highlighted item and multi-select bookkeeping.

use std::collections::BTreeSet;

use crate::core::item::ItemStore;
use crate::core::matcher::MatchList;

/// `current` is a match-list position; `chosen` holds item ids and survives re-matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<usize>,
    chosen: BTreeSet<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Points at the head of a freshly built list, or nothing when it is empty.
    pub fn reset(&mut self, len: usize) {
        self.current = (len > 0).then_some(0);
    }

    /// Sets the highlighted position; out-of-range positions are ignored.
    pub fn set_current(&mut self, position: usize, len: usize) -> bool {
        if position >= len {
            return false;
        }
        self.current = Some(position);
        true
    }

    /// Moves the highlight by `delta` positions. A move that would leave the list is a no-op.
    pub fn step(&mut self, delta: isize, len: usize) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let Some(target) = current.checked_add_signed(delta) else {
            return false;
        };
        if target >= len || delta == 0 {
            return false;
        }
        self.current = Some(target);
        true
    }

    /// Flips membership of `id`; returns whether it is chosen afterwards.
    pub fn toggle(&mut self, id: usize) -> bool {
        if self.chosen.remove(&id) {
            false
        } else {
            self.chosen.insert(id);
            true
        }
    }

    pub fn is_chosen(&self, id: usize) -> bool {
        self.chosen.contains(&id)
    }

    pub fn chosen(&self) -> impl Iterator<Item = usize> + '_ {
        self.chosen.iter().copied()
    }

    pub fn chosen_count(&self) -> usize {
        self.chosen.len()
    }

    /// Item id under the highlight.
    pub fn current_id(&self, list: &MatchList) -> Option<usize> {
        self.current.and_then(|position| list.id_at(position))
    }

    /// Texts to emit on commit.
    ///
    /// Chosen items win, in store order. Otherwise the highlighted item, or `raw` when nothing is
    /// highlighted. With `print_index` items are emitted as their load index.
    pub fn commit_output(
        &self,
        store: &ItemStore,
        list: &MatchList,
        raw: &str,
        print_index: bool,
    ) -> Vec<String> {
        let render = |id: usize| -> Option<String> {
            let item = store.get(id)?;
            Some(if print_index {
                item.id().to_string()
            } else {
                item.output().to_string()
            })
        };

        if !self.chosen.is_empty() {
            return self.chosen.iter().filter_map(|id| render(*id)).collect();
        }
        match self.current_id(list).and_then(render) {
            Some(text) => vec![text],
            None => vec![raw.to_string()],
        }
    }
}
