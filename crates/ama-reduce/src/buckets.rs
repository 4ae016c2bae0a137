use indexmap::IndexMap;

/// Source blocks grouped by source-sink separation.
///
/// Separations keep the order in which they first appeared in the stream; the
/// block ordinals of each separation keep stream order.
#[derive(Debug, Clone, Default)]
pub struct SeparationTable {
    groups: IndexMap<i64, Vec<usize>>,
}

impl SeparationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files block `ordinal` under `separation`.
    pub fn record(&mut self, separation: i64, ordinal: usize) {
        self.groups.entry(separation).or_default().push(ordinal);
    }

    /// Number of blocks filed under `separation`.
    pub fn multiplicity(&self, separation: i64) -> usize {
        self.groups.get(&separation).map_or(0, Vec::len)
    }

    /// Block ordinals filed under `separation`.
    pub fn blocks(&self, separation: i64) -> Option<&[usize]> {
        self.groups.get(&separation).map(Vec::as_slice)
    }

    /// Distinct separations in order of first appearance.
    pub fn separations(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.keys().copied()
    }

    /// Number of distinct separations.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no block was filed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of all multiplicities.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
