use num::Num;
use serde::{Deserialize, Serialize};

/// Sparse vector of `(dimension id, value)` pairs.
///
/// Entries are kept sorted ascending by id, ids are unique within a vector,
/// and zero values are never stored. This is the unit a corpus yields, one
/// document at a time: `SparseVec<u32>` for raw bag-of-words counts,
/// `SparseVec<f64>` for weighted representations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N = u32>
where
    N: Num + Copy,
{
    entries: Vec<(u32, N)>,
}

/// A document's bag-of-words projection: `(token id, occurrence count)`.
pub type BowVector = SparseVec<u32>;

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Build from unordered `(id, value)` pairs.
    /// Duplicate ids are summed, zero values dropped, entries sorted by id.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, N)>,
    {
        let mut entries: Vec<(u32, N)> = pairs.into_iter().collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        let mut merged: Vec<(u32, N)> = Vec::with_capacity(entries.len());
        for (id, value) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == id => last.1 = last.1 + value,
                _ => merged.push((id, value)),
            }
        }
        merged.retain(|&(_, value)| !value.is_zero());
        Self { entries: merged }
    }

    /// Entries sorted ascending by id.
    #[inline]
    pub fn entries(&self) -> &[(u32, N)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(u32, N)> {
        self.entries
    }

    /// Number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at a dimension, `None` if the dimension is not stored.
    pub fn get(&self, id: u32) -> Option<N> {
        self.entries
            .binary_search_by_key(&id, |&(i, _)| i)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    /// Highest stored dimension id, `None` for the empty vector.
    pub fn max_id(&self) -> Option<u32> {
        self.entries.last().map(|&(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, N)> {
        self.entries.iter()
    }
}

impl<N> Default for SparseVec<N>
where
    N: Num + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> FromIterator<(u32, N)> for SparseVec<N>
where
    N: Num + Copy,
{
    fn from_iter<I: IntoIterator<Item = (u32, N)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_sorts_and_merges() {
        let v = SparseVec::from_pairs([(3u32, 1u32), (0, 2), (3, 4)]);
        assert_eq!(v.entries(), &[(0, 2), (3, 5)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.max_id(), Some(3));
    }

    #[test]
    fn from_pairs_drops_zeros() {
        let v: SparseVec<f64> = SparseVec::from_pairs([(1, 0.0), (2, 0.5)]);
        assert_eq!(v.entries(), &[(2, 0.5)]);
    }

    #[test]
    fn get_uses_binary_search() {
        let v = SparseVec::from_pairs([(10u32, 7u32), (2, 1)]);
        assert_eq!(v.get(10), Some(7));
        assert_eq!(v.get(3), None);
    }

    #[test]
    fn empty_vector_is_valid() {
        let v: BowVector = SparseVec::new();
        assert!(v.is_empty());
        assert_eq!(v.max_id(), None);
    }
}
