//! Contiguous index arena for string ids.
//!
//! Task and resource ids are mapped once to dense `usize` indices so the
//! passes can use plain `Vec` lookups instead of hashing strings repeatedly.

use rustc_hash::FxHashMap;

/// Dense index of an interned id.
pub type NodeIdx = usize;

/// Bidirectional mapping between string ids and dense indices.
///
/// Indices are assigned in insertion order, so iterating `0..len()` visits
/// ids in the order the caller supplied them.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    to_idx: FxHashMap<String, NodeIdx>,
    from_idx: Vec<String>,
}

impl IdIndex {
    /// Create an empty index with room for `capacity` ids.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_idx: Vec::with_capacity(capacity),
        }
    }

    /// Insert a new id. Returns `None` if the id was already present.
    pub fn insert_unique(&mut self, id: &str) -> Option<NodeIdx> {
        if self.to_idx.contains_key(id) {
            return None;
        }
        let idx = self.from_idx.len();
        self.from_idx.push(id.to_string());
        self.to_idx.insert(id.to_string(), idx);
        Some(idx)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<NodeIdx> {
        self.to_idx.get(id).copied()
    }

    /// Get the id string for an index.
    ///
    /// Indices handed out by this arena are always valid, so callers inside
    /// the crate index directly; out-of-range access is a programming error.
    #[inline]
    pub fn resolve(&self, idx: NodeIdx) -> &str {
        &self.from_idx[idx]
    }

    pub fn len(&self) -> usize {
        self.from_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_idx.is_empty()
    }

    /// Resolve a list of indices into owned id strings.
    pub fn resolve_all(&self, indices: &[NodeIdx]) -> Vec<String> {
        indices
            .iter()
            .map(|&idx| self.resolve(idx).to_string())
            .collect()
    }
}
