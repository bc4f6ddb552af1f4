//! Insertion-ordered entry store.
//!
//! # Why not a plain `HashMap`? (for beginners)
//!
//! A `HashMap` gives O(1) lookup but iterates in an unpredictable order.  If
//! the saved file followed hash order, every save could shuffle the lines and
//! a one-value change would show up as a whole-file diff.  `OrderedStore`
//! keeps the entries in a `Vec` (which remembers insertion order) and a
//! `HashMap` from identifier to slot index (which gives O(1) lookup).
//!
//! Overwriting an existing identifier updates its slot in place, so the entry
//! keeps its original position.  Removing and re-inserting moves it to the end.

use std::collections::HashMap;

/// A map from string identifiers to `V` that iterates in insertion order.
///
/// # Examples
///
/// ```rust
/// use iniconf_core::OrderedStore;
///
/// let mut store = OrderedStore::new();
/// store.insert("b", 1);
/// store.insert("a", 2);
/// store.insert("b", 3);
///
/// let ids: Vec<&str> = store.iter().map(|(id, _)| id).collect();
/// assert_eq!(ids, ["b", "a"]);
/// assert_eq!(store.get("b"), Some(&3));
/// ```
#[derive(Debug, Clone)]
pub struct OrderedStore<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> OrderedStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the value stored under `id`.
    pub fn get(&self, id: &str) -> Option<&V> {
        self.index.get(id).map(|&slot| &self.entries[slot].1)
    }

    /// Returns a mutable reference to the value stored under `id`.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut V> {
        let slot = *self.index.get(id)?;
        Some(&mut self.entries[slot].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Inserts `value` under `id`, overwriting any existing value in place.
    ///
    /// The store does not report whether the identifier was new; callers that
    /// need to know check [`contains`](Self::contains) first.
    pub fn insert(&mut self, id: impl Into<String>, value: V) {
        let id = id.into();
        if let Some(&slot) = self.index.get(&id) {
            self.entries[slot].1 = value;
            return;
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
    }

    /// Removes the entry under `id`, shifting later entries forward.
    pub fn remove(&mut self, id: &str) -> Option<V> {
        let slot = self.index.remove(id)?;
        let (_, value) = self.entries.remove(slot);
        for later in &self.entries[slot..] {
            if let Some(i) = self.index.get_mut(&later.0) {
                *i -= 1;
            }
        }
        Some(value)
    }

    /// Removes every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Calls `visitor` for every entry in insertion order.
    ///
    /// The walk stops early when `visitor` returns `false`.  Returns `true`
    /// when every entry was visited.
    pub fn for_each<F>(&self, mut visitor: F) -> bool
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.entries.iter().all(|(id, value)| visitor(id, value))
    }

    /// Iterates `(id, value)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::ScalarValue;

    fn ids<V>(store: &OrderedStore<V>) -> Vec<String> {
        store.iter().map(|(id, _)| id.to_string()).collect()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store: OrderedStore<ScalarValue> = OrderedStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_insert_then_get() {
        // Arrange
        let mut store = OrderedStore::new();

        // Act
        store.insert("net#/#port", ScalarValue::new(24800u32));

        // Assert
        assert!(store.contains("net#/#port"));
        assert_eq!(store.get("net#/#port").map(ScalarValue::as_u32), Some(24800));
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut store = OrderedStore::new();
        for id in ["zeta", "alpha", "mid"] {
            store.insert(id, ScalarValue::new(id));
        }
        assert_eq!(ids(&store), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_overwrite_keeps_original_position() {
        // Arrange
        let mut store = OrderedStore::new();
        store.insert("a", ScalarValue::new(1i32));
        store.insert("b", ScalarValue::new(2i32));

        // Act
        store.insert("a", ScalarValue::new(10i32));

        // Assert
        assert_eq!(store.len(), 2);
        assert_eq!(ids(&store), ["a", "b"]);
        assert_eq!(store.get("a").map(ScalarValue::as_i32), Some(10));
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut store = OrderedStore::new();
        store.insert("a", ScalarValue::new("old"));

        store.get_mut("a").unwrap().assign("new").unwrap();

        assert_eq!(store.get("a").unwrap().raw_text(), "new");
    }

    #[test]
    fn test_remove_then_reinsert_moves_entry_to_end() {
        // Arrange
        let mut store = OrderedStore::new();
        for id in ["a", "b", "c"] {
            store.insert(id, 0u8);
        }

        // Act
        assert_eq!(store.remove("a"), Some(0));
        store.insert("a", 1u8);

        // Assert
        assert_eq!(ids(&store), ["b", "c", "a"]);
        assert_eq!(store.get("c"), Some(&0));
        assert_eq!(store.get("a"), Some(&1));
    }

    #[test]
    fn test_remove_missing_returns_none() {
        let mut store: OrderedStore<u8> = OrderedStore::new();
        assert_eq!(store.remove("nope"), None);
    }

    #[test]
    fn test_reset_clears_entries_and_order() {
        let mut store = OrderedStore::new();
        store.insert("a", 1u8);
        store.insert("b", 2u8);

        store.reset();
        store.insert("b", 3u8);

        assert_eq!(ids(&store), ["b"]);
        assert!(!store.contains("a"));
    }

    #[test]
    fn test_for_each_visits_all_in_order() {
        let mut store = OrderedStore::new();
        store.insert("x", 1u8);
        store.insert("y", 2u8);

        let mut seen = Vec::new();
        let completed = store.for_each(|id, v| {
            seen.push((id.to_string(), *v));
            true
        });

        assert!(completed);
        assert_eq!(seen, [("x".to_string(), 1), ("y".to_string(), 2)]);
    }

    #[test]
    fn test_for_each_stops_when_visitor_returns_false() {
        let mut store = OrderedStore::new();
        for id in ["a", "b", "c"] {
            store.insert(id, 0u8);
        }

        let mut visited = 0;
        let completed = store.for_each(|id, _| {
            visited += 1;
            id != "b"
        });

        assert!(!completed);
        assert_eq!(visited, 2);
    }
}
