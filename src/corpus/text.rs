use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::corpus::VectorCorpus;
use crate::dictionary::Dictionary;
use crate::error::{CorpusError, Result};
use crate::sparse::BowVector;
use crate::tokenize::simple_tokenize;

/// Line-oriented streaming corpus: one document per line, tokens separated
/// by whitespace.
///
/// The corpus never loads the backing file into memory. Each pass opened by
/// `try_iter` reads one line at a time, lowercases it, splits on
/// whitespace, maps tokens through the shared [`Dictionary`] and yields the
/// resulting bag-of-words vector. At most one raw line and one vector are
/// alive at any instant, so memory use is independent of corpus size.
///
/// Empty lines yield empty vectors rather than being skipped, keeping
/// document positions aligned with any parallel structure. Tokens the
/// dictionary does not know are silently dropped.
///
/// There is no caching of line offsets between passes: every pass re-reads
/// the file as it currently is on disk.
#[derive(Debug, Clone)]
pub struct TextCorpus {
    path: PathBuf,
    dictionary: Arc<Dictionary>,
}

impl TextCorpus {
    /// Create a corpus over `path`. The locator is validated for shape
    /// only; the file itself is first touched when a pass starts.
    pub fn new(path: impl Into<PathBuf>, dictionary: Arc<Dictionary>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(CorpusError::Configuration(
                "empty source path".to_string(),
            ));
        }
        Ok(Self { path, dictionary })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }
}

impl VectorCorpus<u32> for TextCorpus {
    type Iter = BowStream<BufReader<File>>;

    fn try_iter(&self) -> Result<Self::Iter> {
        let file = File::open(&self.path).map_err(|source| CorpusError::SourceNotFound {
            path: self.path.clone(),
            source,
        })?;
        Ok(BowStream::new(BufReader::new(file), Arc::clone(&self.dictionary)))
    }
}

/// One iteration pass over a line-oriented source.
///
/// Owns its reader; dropping the stream releases the handle, whether the
/// pass ran to exhaustion, was abandoned early, or hit a read error. After
/// the first I/O failure the stream drops its reader immediately and
/// yields nothing further.
#[derive(Debug)]
pub struct BowStream<R> {
    reader: Option<R>,
    dictionary: Arc<Dictionary>,
    line: String,
}

impl<R: BufRead> BowStream<R> {
    pub fn new(reader: R, dictionary: Arc<Dictionary>) -> Self {
        Self {
            reader: Some(reader),
            dictionary,
            line: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for BowStream<R> {
    type Item = Result<BowVector>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        self.line.clear();
        match reader.read_line(&mut self.line) {
            Ok(0) => {
                self.reader = None;
                None
            }
            Ok(_) => {
                let tokens = simple_tokenize(&self.line);
                Some(Ok(self.dictionary.doc2bow(&tokens)))
            }
            Err(err) => {
                self.reader = None;
                Some(Err(CorpusError::SourceRead(err)))
            }
        }
    }
}
