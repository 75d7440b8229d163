//! Hooks the engine calls out to.

/// Which selection a paste request reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasteSelection {
    Primary,
    Clipboard,
}

/// Supplies a pre-filtered candidate list for the current query.
///
/// When installed, the engine asks for fresh lines before every match. The returned lines
/// replace the item store; in tiered mode they are ranked without token filtering.
pub trait DynamicSource {
    fn refresh(&mut self, query: &str) -> Vec<String>;
}

impl<F> DynamicSource for F
where
    F: FnMut(&str) -> Vec<String>,
{
    fn refresh(&mut self, query: &str) -> Vec<String> {
        self(query)
    }
}
