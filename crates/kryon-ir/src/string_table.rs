use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Index into a [`StringTable`]. Index 0 is always the empty string.
pub type StringIndex = u32;

/// Deduplicated, insertion-ordered string pool. `IndexSet` gives us O(1)
/// dedup-or-insert plus a stable iteration order, so the binary writer never
/// leaks a `HashMap`'s hash order into its output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringTable {
    strings: IndexSet<String>,
}

impl StringTable {
    pub fn new() -> Self {
        let mut strings = IndexSet::new();
        strings.insert(String::new());
        Self { strings }
    }

    /// Interns `s`, returning its index. Calling this twice with equal
    /// strings always returns the same index.
    pub fn intern(&mut self, s: &str) -> StringIndex {
        if let Some(idx) = self.strings.get_index_of(s) {
            return idx as StringIndex;
        }
        self.strings.insert_full(s.to_string()).0 as StringIndex
    }

    pub fn get(&self, index: StringIndex) -> Option<&str> {
        self.strings.get_index(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_is_empty_string() {
        let table = StringTable::new();
        assert_eq!(table.get(0), Some(""));
    }

    #[test]
    fn identical_strings_share_one_index() {
        let mut table = StringTable::new();
        let a = table.intern("Button");
        let b = table.intern("Button");
        assert_eq!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn distinct_strings_get_distinct_indices() {
        let mut table = StringTable::new();
        let a = table.intern("Button");
        let b = table.intern("Text");
        assert_ne!(a, b);
    }
}
