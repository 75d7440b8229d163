//! Page boundaries over the match list.
//!
//! Pages are addressed by match-list positions. A page is the half-open range
//! `[start, end)`; `prev_start` is where the page before it begins when paging backwards
//! from `start`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Vertical list or grid: a page holds `rows * columns` items.
    Fixed { rows: usize, columns: usize },
    /// Single line: items are packed until their widths exceed `budget` cells.
    Measured { budget: usize },
}

impl Layout {
    fn limit(&self) -> usize {
        match *self {
            Layout::Fixed { rows, columns } => rows.saturating_mul(columns.max(1)).max(1),
            Layout::Measured { budget } => budget,
        }
    }

    fn cost<F>(&self, position: usize, width_at: &mut F) -> usize
    where
        F: FnMut(usize) -> usize,
    {
        match *self {
            Layout::Fixed { .. } => 1,
            // An item wider than the budget still fills exactly one page.
            Layout::Measured { budget } => width_at(position).min(budget),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub start: usize,
    pub end: usize,
    pub prev_start: usize,
}

impl Page {
    pub fn contains(&self, position: usize) -> bool {
        (self.start..self.end).contains(&position)
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.end < len
    }

    pub fn has_prev(&self) -> bool {
        self.start > 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Computes the page that begins at `start`.
///
/// `width_at` is only consulted in the measured layout, with match-list positions.
pub fn paginate<F>(layout: Layout, len: usize, start: usize, mut width_at: F) -> Page
where
    F: FnMut(usize) -> usize,
{
    if len == 0 {
        return Page::default();
    }
    let start = start.min(len - 1);
    let limit = layout.limit();

    let mut used = 0usize;
    let mut end = start;
    while end < len {
        used = used.saturating_add(layout.cost(end, &mut width_at));
        if used > limit {
            break;
        }
        end += 1;
    }
    // The first item always fits; widths are clamped to the budget.
    let end = end.max(start + 1);

    let mut used = 0usize;
    let mut prev_start = start;
    while prev_start > 0 {
        used = used.saturating_add(layout.cost(prev_start - 1, &mut width_at));
        if used > limit {
            break;
        }
        prev_start -= 1;
    }

    Page {
        start,
        end,
        prev_start,
    }
}

/// Walks pages forward from the first item until one contains `target`.
pub fn page_containing<F>(layout: Layout, len: usize, target: usize, mut width_at: F) -> Page
where
    F: FnMut(usize) -> usize,
{
    let mut page = paginate(layout, len, 0, &mut width_at);
    while page.end <= target && page.end < len {
        page = paginate(layout, len, page.end, &mut width_at);
    }
    page
}
