use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::info;
use num::Num;

use crate::corpus::VectorCorpus;
use crate::error::{CorpusError, Result};
use crate::sparse::SparseVec;

/// Matrix Market banner for a sparse real matrix.
const MM_BANNER: &str = "%%MatrixMarket matrix coordinate real general";

/// Width reserved for the size line so it can be backfilled after a
/// single streaming pass over the corpus.
const SIZE_LINE_WIDTH: usize = 50;

/// Streaming writer for the Matrix Market coordinate format.
///
/// Documents are rows, term ids are columns, both 1-based on disk. The
/// size line (`docs terms nnz`) is only known after the pass, so the
/// writer reserves a blank line up front and seeks back to fill it in;
/// the corpus itself is never buffered.
pub struct MatrixMarketWriter;

impl MatrixMarketWriter {
    /// Serialize a corpus to `path`, streaming one document at a time.
    pub fn serialize<N, C>(path: impl AsRef<Path>, corpus: &C) -> Result<()>
    where
        N: Num + Copy + Display,
        C: VectorCorpus<N>,
    {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{}", MM_BANNER)?;
        let size_pos = out.stream_position()?;
        writeln!(out, "{}", " ".repeat(SIZE_LINE_WIDTH))?;

        let mut num_docs: u64 = 0;
        let mut num_terms: u64 = 0;
        let mut num_nnz: u64 = 0;
        for document in corpus.try_iter()? {
            let document = document?;
            let docno = num_docs + 1;
            for &(id, value) in document.entries() {
                writeln!(out, "{} {} {}", docno, id + 1, value)?;
                num_nnz += 1;
            }
            if let Some(max_id) = document.max_id() {
                num_terms = num_terms.max(max_id as u64 + 1);
            }
            num_docs += 1;
        }

        let size_line = format!("{} {} {}", num_docs, num_terms, num_nnz);
        debug_assert!(size_line.len() <= SIZE_LINE_WIDTH);
        out.seek(SeekFrom::Start(size_pos))?;
        out.write_all(size_line.as_bytes())?;
        out.flush()?;
        info!(
            "saved {}x{} matrix, {} non-zero entries to {}",
            num_docs,
            num_terms,
            num_nnz,
            path.display()
        );
        Ok(())
    }
}

/// Streaming reader for Matrix Market corpora.
///
/// The header is parsed once at `open`; each `try_iter` pass reopens the
/// file and yields documents in order. Rows absent from the entry list
/// come back as empty vectors, so document positions survive a round trip
/// through this format.
#[derive(Debug, Clone)]
pub struct MatrixMarketCorpus {
    path: PathBuf,
    num_docs: u64,
    num_terms: u64,
    num_nnz: u64,
}

impl MatrixMarketCorpus {
    /// Open a Matrix Market file and parse its header.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|source| CorpusError::SourceNotFound {
            path: path.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(CorpusError::SourceRead)?;
        if !line.starts_with("%%MatrixMarket") {
            return Err(CorpusError::Format {
                line: 1,
                reason: "missing %%MatrixMarket banner".to_string(),
            });
        }
        if !line.contains("coordinate") {
            return Err(CorpusError::Format {
                line: 1,
                reason: "only coordinate format is supported".to_string(),
            });
        }

        let mut line_no = 1;
        loop {
            line.clear();
            line_no += 1;
            let read = reader
                .read_line(&mut line)
                .map_err(CorpusError::SourceRead)?;
            if read == 0 {
                return Err(CorpusError::Format {
                    line: line_no,
                    reason: "missing size line".to_string(),
                });
            }
            if line.starts_with('%') || line.trim().is_empty() {
                continue;
            }
            let (num_docs, num_terms, num_nnz) = parse_size_line(&line, line_no)?;
            return Ok(Self {
                path,
                num_docs,
                num_terms,
                num_nnz,
            });
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents (matrix rows).
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Number of features (matrix columns).
    pub fn num_terms(&self) -> u64 {
        self.num_terms
    }

    /// Number of stored entries.
    pub fn num_nnz(&self) -> u64 {
        self.num_nnz
    }
}

impl Display for MatrixMarketCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MatrixMarketCorpus({} documents, {} features, {} non-zero entries)",
            self.num_docs, self.num_terms, self.num_nnz
        )
    }
}

impl VectorCorpus<f64> for MatrixMarketCorpus {
    type Iter = MatrixMarketIter;

    fn try_iter(&self) -> Result<Self::Iter> {
        let file = File::open(&self.path).map_err(|source| CorpusError::SourceNotFound {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        // skip banner, comments and the size line; the header was already
        // validated at open()
        let mut line = String::new();
        let mut line_no: u64 = 0;
        loop {
            line.clear();
            line_no += 1;
            let read = reader
                .read_line(&mut line)
                .map_err(CorpusError::SourceRead)?;
            if read == 0 {
                break;
            }
            if line.starts_with('%') || line.trim().is_empty() {
                continue;
            }
            // first non-comment line is the size line
            break;
        }

        Ok(MatrixMarketIter {
            reader: Some(reader),
            line: String::new(),
            line_no,
            num_docs: self.num_docs,
            emitted: 0,
            pending: None,
        })
    }
}

/// One pass over a Matrix Market file, grouping entries by document.
pub struct MatrixMarketIter {
    reader: Option<BufReader<File>>,
    line: String,
    line_no: u64,
    num_docs: u64,
    emitted: u64,
    /// entry read ahead that belongs to a later document
    pending: Option<(u64, u32, f64)>,
}

impl MatrixMarketIter {
    fn read_entry(&mut self) -> Result<Option<(u64, u32, f64)>> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Ok(None),
        };
        loop {
            self.line.clear();
            self.line_no += 1;
            let read = reader
                .read_line(&mut self.line)
                .map_err(CorpusError::SourceRead)?;
            if read == 0 {
                self.reader = None;
                return Ok(None);
            }
            if self.line.trim().is_empty() {
                continue;
            }
            return parse_entry(&self.line, self.line_no).map(Some);
        }
    }
}

impl Iterator for MatrixMarketIter {
    type Item = Result<SparseVec<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.num_docs {
            self.reader = None;
            return None;
        }
        let current = self.emitted;
        let mut entries: Vec<(u32, f64)> = Vec::new();
        loop {
            let entry = match self.pending.take() {
                Some(entry) => Some(entry),
                None => match self.read_entry() {
                    Ok(entry) => entry,
                    Err(err) => {
                        self.reader = None;
                        return Some(Err(err));
                    }
                },
            };
            match entry {
                // source exhausted: emit this (possibly empty) document;
                // remaining trailing empty documents follow on later calls
                None => break,
                Some((docno, term, value)) if docno == current => {
                    entries.push((term, value));
                }
                Some(entry @ (docno, ..)) if docno > current => {
                    self.pending = Some(entry);
                    break;
                }
                Some((docno, ..)) => {
                    self.reader = None;
                    return Some(Err(CorpusError::Format {
                        line: self.line_no,
                        reason: format!(
                            "document ids out of order: {} after {}",
                            docno + 1,
                            current + 1
                        ),
                    }));
                }
            }
        }
        self.emitted += 1;
        Some(Ok(SparseVec::from_pairs(entries)))
    }
}

fn parse_size_line(line: &str, line_no: u64) -> Result<(u64, u64, u64)> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| -> Result<u64> {
        fields
            .next()
            .ok_or_else(|| CorpusError::Format {
                line: line_no,
                reason: format!("size line is missing the {} field", name),
            })?
            .parse::<u64>()
            .map_err(|_| CorpusError::Format {
                line: line_no,
                reason: format!("size line has a non-numeric {} field", name),
            })
    };
    Ok((next("rows")?, next("columns")?, next("entries")?))
}

/// Parse one `docid termid value` entry, converting ids to 0-based.
fn parse_entry(line: &str, line_no: u64) -> Result<(u64, u32, f64)> {
    let malformed = |reason: &str| CorpusError::Format {
        line: line_no,
        reason: reason.to_string(),
    };
    let mut fields = line.split_whitespace();
    let docno: u64 = fields
        .next()
        .ok_or_else(|| malformed("empty entry"))?
        .parse()
        .map_err(|_| malformed("non-numeric document id"))?;
    let term: u32 = fields
        .next()
        .ok_or_else(|| malformed("entry is missing the term id"))?
        .parse()
        .map_err(|_| malformed("non-numeric term id"))?;
    let value: f64 = fields
        .next()
        .ok_or_else(|| malformed("entry is missing the value"))?
        .parse()
        .map_err(|_| malformed("non-numeric value"))?;
    if docno == 0 || term == 0 {
        return Err(malformed("matrix market ids are 1-based"));
    }
    Ok((docno - 1, term - 1, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_line_parses() {
        assert_eq!(parse_size_line("9 12  28\n", 2).unwrap(), (9, 12, 28));
        assert!(parse_size_line("9 12\n", 2).is_err());
        assert!(parse_size_line("9 twelve 28\n", 2).is_err());
    }

    #[test]
    fn entry_parses_to_zero_based() {
        assert_eq!(parse_entry("3 7 0.5\n", 4).unwrap(), (2, 6, 0.5));
        assert_eq!(parse_entry("1 1 2\n", 4).unwrap(), (0, 0, 2.0));
    }

    #[test]
    fn zero_ids_are_rejected() {
        assert!(matches!(
            parse_entry("0 1 0.5\n", 4),
            Err(CorpusError::Format { line: 4, .. })
        ));
    }
}
