use num::Num;

use crate::corpus::VectorCorpus;
use crate::error::Result;
use crate::sparse::SparseVec;

/// A corpus held fully in memory, mostly useful for small collections and
/// as a source for the on-disk writers.
///
/// Each pass clones the documents, which keeps passes independent but
/// makes this the one corpus type whose cost grows with collection size.
/// For anything large, prefer a streaming corpus.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus<N = u32>
where
    N: Num + Copy,
{
    documents: Vec<SparseVec<N>>,
}

impl<N> MemoryCorpus<N>
where
    N: Num + Copy,
{
    pub fn new(documents: Vec<SparseVec<N>>) -> Self {
        Self { documents }
    }

    pub fn push(&mut self, document: SparseVec<N>) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[SparseVec<N>] {
        &self.documents
    }
}

impl<N> FromIterator<SparseVec<N>> for MemoryCorpus<N>
where
    N: Num + Copy,
{
    fn from_iter<I: IntoIterator<Item = SparseVec<N>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<N> VectorCorpus<N> for MemoryCorpus<N>
where
    N: Num + Copy,
{
    type Iter = MemoryIter<N>;

    fn try_iter(&self) -> Result<Self::Iter> {
        Ok(MemoryIter {
            inner: self.documents.clone().into_iter(),
        })
    }
}

pub struct MemoryIter<N>
where
    N: Num + Copy,
{
    inner: std::vec::IntoIter<SparseVec<N>>,
}

impl<N> Iterator for MemoryIter<N>
where
    N: Num + Copy,
{
    type Item = Result<SparseVec<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ok)
    }
}
