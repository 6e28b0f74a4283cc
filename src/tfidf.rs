use std::collections::HashMap;
use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::corpus::VectorCorpus;
use crate::error::Result;
use crate::sparse::{BowVector, SparseVec};

/// TF-IDF weighting model.
///
/// Fitting is a single pass over a bag-of-words corpus collecting document
/// frequencies. From then on the model is read-only: `apply` reweights any
/// vector from the same vocabulary space, whether or not that document was
/// part of the fitting corpus.
///
/// Weights are `count * log2(num_docs / df)`, L2-normalized per document.
/// Tokens never seen while fitting get weight zero and drop out of the
/// result, as do tokens present in every document (idf = 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfModel {
    dfs: HashMap<u32, u64>,
    num_docs: u64,
}

impl TfidfModel {
    /// Collect document frequencies from one pass over `corpus`.
    pub fn fit<C>(corpus: &C) -> Result<Self>
    where
        C: VectorCorpus<u32>,
    {
        let mut dfs: HashMap<u32, u64> = HashMap::new();
        let mut num_docs: u64 = 0;
        for document in corpus.try_iter()? {
            let document = document?;
            for &(id, _) in document.entries() {
                *dfs.entry(id).or_insert(0) += 1;
            }
            num_docs += 1;
        }
        info!(
            "collected document frequencies for {} features over {} documents",
            dfs.len(),
            num_docs
        );
        Ok(Self { dfs, num_docs })
    }

    /// Inverse document frequency of a feature, 0.0 for unseen features.
    pub fn idf(&self, id: u32) -> f64 {
        match self.dfs.get(&id) {
            Some(&df) if df > 0 => (self.num_docs as f64 / df as f64).log2(),
            _ => 0.0,
        }
    }

    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Reweight one bag-of-words vector. The result is L2-normalized;
    /// zero-weight features are dropped.
    pub fn apply(&self, bow: &BowVector) -> SparseVec<f64> {
        let mut entries: Vec<(u32, f64)> = bow
            .entries()
            .iter()
            .filter_map(|&(id, count)| {
                let weight = count as f64 * self.idf(id);
                (weight != 0.0).then_some((id, weight))
            })
            .collect();
        let norm = entries
            .iter()
            .map(|&(_, w)| w * w)
            .sum::<f64>()
            .sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut entries {
                *weight /= norm;
            }
        }
        SparseVec::from_pairs(entries)
    }

    /// Wrap a corpus into a lazy TF-IDF view: documents are reweighted on
    /// the fly as the consumer pulls them, nothing is materialized.
    pub fn transform<'a, C>(&'a self, corpus: &'a C) -> TfidfCorpus<'a, C>
    where
        C: VectorCorpus<u32>,
    {
        TfidfCorpus {
            model: self,
            corpus,
        }
    }
}

impl fmt::Display for TfidfModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TfidfModel({} documents, {} features)",
            self.num_docs,
            self.dfs.len()
        )
    }
}

/// Lazy TF-IDF view over a bag-of-words corpus. Restartable exactly like
/// its inner corpus: each pass opens a fresh inner pass.
#[derive(Debug, Clone, Copy)]
pub struct TfidfCorpus<'a, C> {
    model: &'a TfidfModel,
    corpus: &'a C,
}

impl<'a, C> VectorCorpus<f64> for TfidfCorpus<'a, C>
where
    C: VectorCorpus<u32>,
{
    type Iter = TfidfIter<'a, C::Iter>;

    fn try_iter(&self) -> Result<Self::Iter> {
        Ok(TfidfIter {
            model: self.model,
            inner: self.corpus.try_iter()?,
        })
    }
}

pub struct TfidfIter<'a, I> {
    model: &'a TfidfModel,
    inner: I,
}

impl<'a, I> Iterator for TfidfIter<'a, I>
where
    I: Iterator<Item = Result<BowVector>>,
{
    type Item = Result<SparseVec<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.inner.next()?;
        Some(document.map(|bow| self.model.apply(&bow)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemoryCorpus;
    use crate::sparse::SparseVec;

    fn fitting_corpus() -> MemoryCorpus<u32> {
        // feature 0 appears everywhere, 1 in one doc, 2 in two docs
        MemoryCorpus::new(vec![
            SparseVec::from_pairs([(0, 1), (1, 2)]),
            SparseVec::from_pairs([(0, 3), (2, 1)]),
            SparseVec::from_pairs([(0, 1), (2, 2)]),
        ])
    }

    #[test]
    fn idf_from_document_frequencies() {
        let model = TfidfModel::fit(&fitting_corpus()).unwrap();
        assert_eq!(model.num_docs(), 3);
        assert_eq!(model.idf(0), 0.0);
        assert!((model.idf(1) - (3.0f64).log2()).abs() < 1e-12);
        assert!((model.idf(2) - (1.5f64).log2()).abs() < 1e-12);
        assert_eq!(model.idf(99), 0.0);
    }

    #[test]
    fn apply_normalizes_and_drops_flat_features() {
        let model = TfidfModel::fit(&fitting_corpus()).unwrap();
        let weighted = model.apply(&SparseVec::from_pairs([(0, 5), (1, 1), (2, 1)]));
        // feature 0 has idf 0 and disappears
        assert_eq!(weighted.get(0), None);
        assert!(weighted.get(1).is_some());
        let norm: f64 = weighted.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn apply_on_unknown_features_is_empty() {
        let model = TfidfModel::fit(&fitting_corpus()).unwrap();
        let weighted = model.apply(&SparseVec::from_pairs([(7, 4)]));
        assert!(weighted.is_empty());
    }

    #[test]
    fn transform_matches_apply_and_restarts() {
        let corpus = fitting_corpus();
        let model = TfidfModel::fit(&corpus).unwrap();
        let lazy = model.transform(&corpus);

        let first: Vec<_> = lazy
            .try_iter()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let second: Vec<_> = lazy
            .try_iter()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(first, second);

        let direct: Vec<_> = corpus
            .documents()
            .iter()
            .map(|bow| model.apply(bow))
            .collect();
        assert_eq!(first, direct);
    }
}
