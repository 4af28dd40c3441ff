//! The ordered record of which passes to run.

/// One entry of a [`PassSelection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassEntry {
    /// Expand the engine's default pipeline here. The expansion uses the
    /// optimization level in effect when the plan runs, not when the entry
    /// was appended.
    Default,
    /// Run exactly this pass.
    Named(String),
}

/// Append-only sequence of pass entries, in directive arrival order.
///
/// Entries are never reordered or deduplicated: a repeated `Named` entry runs
/// the pass again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSelection {
    entries: Vec<PassEntry>,
}

impl PassSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_default(&mut self) {
        self.entries.push(PassEntry::Default);
    }

    pub fn append_named(&mut self, pass: impl Into<String>) {
        self.entries.push(PassEntry::Named(pass.into()));
    }

    /// Whether the default pipeline was requested anywhere.
    pub fn has_default(&self) -> bool {
        self.entries.iter().any(|e| matches!(e, PassEntry::Default))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[PassEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PassEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a PassSelection {
    type Item = &'a PassEntry;
    type IntoIter = std::slice::Iter<'a, PassEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
