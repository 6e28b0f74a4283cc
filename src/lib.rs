/// Streaming bag-of-words corpora.
///
/// A corpus here is anything that can return one sparse document vector at
/// a time: a text file read line by line, an on-disk Matrix Market or
/// SVMlight matrix, an in-memory list, or a lazy TF-IDF view over any of
/// them. Nothing in this crate requires a collection to fit in memory.
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod sparse;
pub mod tfidf;
pub mod tokenize;

/// Token <-> id mapping with document statistics.
/// Built incrementally from a stream of tokenized documents, prunable
/// (stopwords, rare tokens) and persistable in CBOR. The read path
/// (`resolve`, `doc2bow`) never mutates, so one dictionary behind an
/// `Arc` can back any number of concurrent corpus passes.
pub use dictionary::Dictionary;

/// Sparse `(id, value)` vector, ascending ids, no stored zeros.
/// `BowVector` is the `u32`-counted bag-of-words flavor a text corpus
/// yields; weighted corpora yield `SparseVec<f64>`.
pub use sparse::{BowVector, SparseVec};

/// The streaming corpus contract and its implementations.
/// `try_iter()` starts a fresh, restartable, finite pass; each pass owns
/// its source handle and releases it on drop, exhaustion or error.
pub use corpus::{
    MatrixMarketCorpus, MatrixMarketWriter, MemoryCorpus, SvmLightCorpus, SvmLightWriter,
    TextCorpus, VectorCorpus,
};

/// TF-IDF weighting: fit once over a bag-of-words corpus, then reweight
/// individual vectors or wrap whole corpora into a lazy transformed view.
pub use tfidf::TfidfModel;

/// Error taxonomy: configuration, source-open, mid-read, format and
/// persistence failures. Everything propagates; nothing is retried.
pub use error::{CorpusError, Result};
