use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for corpus construction and iteration.
///
/// The crate never retries internally. Every failure propagates to the
/// consumer, and a reader stays usable after a failed pass: a fresh
/// `try_iter()` reopens the source and starts over.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Bad locator or collaborator wiring, detected at construction time.
    #[error("invalid corpus configuration: {0}")]
    Configuration(String),

    /// The backing source could not be opened for an iteration pass.
    #[error("cannot open corpus source {}: {source}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        source: io::Error,
    },

    /// The backing source failed mid-read. The pass ends here; the handle
    /// is released immediately.
    #[error("read error in corpus source: {0}")]
    SourceRead(io::Error),

    /// On-disk corpus content that does not parse.
    #[error("malformed corpus data at line {line}: {reason}")]
    Format {
        line: u64,
        reason: String,
    },

    /// Write-side I/O failure while serializing a corpus.
    #[error("write error: {0}")]
    Write(#[from] io::Error),

    /// Dictionary persistence failure.
    #[error("dictionary serialization error: {0}")]
    Serde(#[from] serde_cbor::Error),
}

pub type Result<T> = std::result::Result<T, CorpusError>;
