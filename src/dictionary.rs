use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};
use crate::sparse::{BowVector, SparseVec};

/// Bidirectional token <-> id mapping with per-token document statistics.
///
/// Ids are assigned in first-seen order during construction and stay stable
/// for the lifetime of the instance (until an explicit `compactify`). The
/// read path (`resolve`, `doc2bow`) never mutates, so a `Dictionary` behind
/// an `Arc` can back any number of concurrent corpus passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    token2id: IndexMap<String, u32>,
    /// token id -> number of documents the token appeared in
    dfs: HashMap<u32, u64>,
    /// documents processed
    num_docs: u64,
    /// total token occurrences across all documents
    num_pos: u64,
    /// total unique-token slots (sum of per-document vocabulary sizes)
    num_nnz: u64,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from a stream of tokenized documents without
    /// materializing the collection.
    pub fn from_documents<I, T>(documents: I) -> Self
    where
        I: IntoIterator<Item = Vec<T>>,
        T: AsRef<str>,
    {
        let mut dict = Self::new();
        for tokens in documents {
            if dict.num_docs % 10_000 == 0 {
                debug!("adding document #{}", dict.num_docs);
            }
            dict.add_document(&tokens);
        }
        info!(
            "built {} from {} documents ({} corpus positions)",
            dict, dict.num_docs, dict.num_pos
        );
        dict
    }

    /// Register one document: assign ids to unseen tokens, update document
    /// frequencies and corpus statistics. Returns the document's
    /// bag-of-words vector.
    pub fn add_document<T>(&mut self, tokens: &[T]) -> BowVector
    where
        T: AsRef<str>,
    {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for token in tokens {
            let next_id = self.token2id.len() as u32;
            let id = *self
                .token2id
                .entry(token.as_ref().to_string())
                .or_insert(next_id);
            *counts.entry(id).or_insert(0) += 1;
            self.num_pos += 1;
        }
        self.num_docs += 1;
        self.num_nnz += counts.len() as u64;
        for &id in counts.keys() {
            *self.dfs.entry(id).or_insert(0) += 1;
        }
        SparseVec::from_pairs(counts)
    }

    /// Token -> id, the one Vocabulary operation a corpus reader needs.
    #[inline]
    pub fn resolve(&self, token: &str) -> Option<u32> {
        self.token2id.get(token).copied()
    }

    /// Id -> token.
    pub fn token_of(&self, id: u32) -> Option<&str> {
        // ids are dense after construction or compactify, so the positional
        // lookup almost always hits; the scan covers post-filter gaps
        if let Some((token, &tid)) = self.token2id.get_index(id as usize) {
            if tid == id {
                return Some(token);
            }
        }
        self.token2id
            .iter()
            .find(|(_, &tid)| tid == id)
            .map(|(token, _)| token.as_str())
    }

    /// Project a tokenized document into vocabulary space.
    /// Tokens unknown to the dictionary are silently dropped.
    pub fn doc2bow<T>(&self, tokens: &[T]) -> BowVector
    where
        T: AsRef<str>,
    {
        SparseVec::from_pairs(
            tokens
                .iter()
                .filter_map(|t| self.resolve(t.as_ref()))
                .map(|id| (id, 1)),
        )
    }

    /// Number of documents a token id appeared in.
    pub fn df(&self, id: u32) -> u64 {
        self.dfs.get(&id).copied().unwrap_or(0)
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.token2id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token2id.is_empty()
    }

    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    pub fn num_pos(&self) -> u64 {
        self.num_pos
    }

    pub fn num_nnz(&self) -> u64 {
        self.num_nnz
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.token2id.iter().map(|(token, &id)| (token.as_str(), id))
    }
}

/// Vocabulary pruning.
impl Dictionary {
    /// Remove the given token ids. Leaves gaps in the id sequence;
    /// call `compactify` to close them.
    pub fn filter_tokens<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let remove: HashSet<u32> = ids.into_iter().collect();
        self.token2id.retain(|_, id| !remove.contains(id));
        for id in &remove {
            self.dfs.remove(id);
        }
    }

    /// Reassign consecutive ids in current map order, closing any gaps
    /// left by `filter_tokens`.
    pub fn compactify(&mut self) {
        let mut dfs = HashMap::with_capacity(self.token2id.len());
        for (new_id, old_id) in self.token2id.values_mut().enumerate() {
            let new_id = new_id as u32;
            if let Some(df) = self.dfs.remove(old_id) {
                dfs.insert(new_id, df);
            }
            *old_id = new_id;
        }
        self.dfs = dfs;
    }

    /// Drop tokens that appear in fewer than `no_below` documents and
    /// compactify the id space.
    pub fn filter_extremes(&mut self, no_below: u64) {
        let before = self.len();
        let rare: Vec<u32> = self
            .dfs
            .iter()
            .filter(|&(_, &df)| df < no_below)
            .map(|(&id, _)| id)
            .collect();
        self.filter_tokens(rare);
        self.compactify();
        info!(
            "discarded {} tokens appearing in fewer than {} documents, keeping {}",
            before - self.len(),
            no_below,
            self.len()
        );
    }
}

/// Persistence in CBOR.
impl Dictionary {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = BufWriter::new(File::create(path.as_ref())?);
        serde_cbor::to_writer(file, self)?;
        info!("saved {} to {}", self, path.as_ref().display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|source| CorpusError::SourceNotFound {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let file = BufReader::new(file);
        let dict: Dictionary = serde_cbor::from_reader(file)?;
        info!("loaded {} from {}", dict, path.as_ref().display());
        Ok(dict)
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dictionary({} unique tokens)", self.token2id.len())
    }
}
