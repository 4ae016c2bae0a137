use std::hash::Hash;

use indexmap::IndexMap;

/// Index of the source blocks seen in the exact stream.
///
/// Every block is recorded in stream order. Lookups resolve a key to the
/// ordinal of the first block carrying it, so a repeated key never shadows the
/// earlier block.
#[derive(Debug, Clone)]
pub struct SourceIndex<K> {
    lookup: IndexMap<K, usize>,
    blocks: usize,
}

/// Index keyed by source timeslice, used for two-point data.
pub type SourceTimeIndex = SourceIndex<i64>;

/// Index keyed by (source, sink), used for three-point data.
pub type SourceSinkIndex = SourceIndex<(i64, i64)>;

impl<K> Default for SourceIndex<K> {
    fn default() -> Self {
        Self {
            lookup: IndexMap::new(),
            blocks: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> SourceIndex<K> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block with `key` and returns its ordinal.
    pub fn record(&mut self, key: K) -> usize {
        let ordinal = self.blocks;
        self.blocks += 1;
        self.lookup.entry(key).or_insert(ordinal);
        ordinal
    }

    /// Ordinal of the first block recorded with `key`.
    pub fn find(&self, key: &K) -> Option<usize> {
        self.lookup.get(key).copied()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether no block was recorded.
    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    /// Number of recorded blocks, counting repeated keys.
    pub fn block_count(&self) -> usize {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_keeps_first_ordinal() {
        let mut index = SourceTimeIndex::new();
        assert_eq!(index.record(7), 0);
        assert_eq!(index.record(3), 1);
        assert_eq!(index.record(7), 2);
        assert_eq!(index.find(&7), Some(0));
        assert_eq!(index.len(), 2);
        assert_eq!(index.block_count(), 3);
    }

    #[test]
    fn pair_lookup_needs_both_coordinates() {
        let mut index = SourceSinkIndex::new();
        index.record((5, 4));
        index.record((6, 4));
        assert_eq!(index.find(&(6, 4)), Some(1));
        assert_eq!(index.find(&(4, 5)), None);
        assert_eq!(index.find(&(5, 5)), None);
    }
}
