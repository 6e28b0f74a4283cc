use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use num::Num;

use crate::corpus::VectorCorpus;
use crate::error::{CorpusError, Result};
use crate::sparse::SparseVec;

/// Writer for the SVMlight format: one document per line,
/// `<target> id:value ...` with 1-based feature ids.
///
/// The target class is not part of the corpus abstraction, so it is
/// written as 0 and ignored on read.
pub struct SvmLightWriter;

impl SvmLightWriter {
    pub fn serialize<N, C>(path: impl AsRef<Path>, corpus: &C) -> Result<()>
    where
        N: Num + Copy + Display,
        C: VectorCorpus<N>,
    {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        let mut num_docs: u64 = 0;
        for document in corpus.try_iter()? {
            let document = document?;
            write!(out, "0")?;
            for &(id, value) in document.entries() {
                write!(out, " {}:{}", id + 1, value)?;
            }
            writeln!(out)?;
            num_docs += 1;
        }
        out.flush()?;
        info!(
            "saved {} documents in SVMlight format to {}",
            num_docs,
            path.display()
        );
        Ok(())
    }
}

/// Streaming reader for SVMlight corpora. Restartable like every corpus:
/// each pass opens its own handle.
#[derive(Debug, Clone)]
pub struct SvmLightCorpus {
    path: PathBuf,
}

impl SvmLightCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(CorpusError::Configuration(
                "empty source path".to_string(),
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VectorCorpus<f64> for SvmLightCorpus {
    type Iter = SvmLightIter;

    fn try_iter(&self) -> Result<Self::Iter> {
        let file = File::open(&self.path).map_err(|source| CorpusError::SourceNotFound {
            path: self.path.clone(),
            source,
        })?;
        Ok(SvmLightIter {
            reader: Some(BufReader::new(file)),
            line: String::new(),
            line_no: 0,
        })
    }
}

pub struct SvmLightIter {
    reader: Option<BufReader<File>>,
    line: String,
    line_no: u64,
}

impl Iterator for SvmLightIter {
    type Item = Result<SparseVec<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;
            self.line.clear();
            self.line_no += 1;
            match reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {
                    // strip trailing comments, skip blank lines
                    let content = match self.line.split_once('#') {
                        Some((content, _)) => content,
                        None => self.line.as_str(),
                    };
                    if content.trim().is_empty() {
                        continue;
                    }
                    match parse_line(content, self.line_no) {
                        Ok(document) => return Some(Ok(document)),
                        Err(err) => {
                            self.reader = None;
                            return Some(Err(err));
                        }
                    }
                }
                Err(err) => {
                    self.reader = None;
                    return Some(Err(CorpusError::SourceRead(err)));
                }
            }
        }
    }
}

/// Parse one `<target> id:value ...` line, converting ids to 0-based.
fn parse_line(content: &str, line_no: u64) -> Result<SparseVec<f64>> {
    let malformed = |reason: String| CorpusError::Format {
        line: line_no,
        reason,
    };
    let mut fields = content.split_whitespace();
    // target class, present but unused
    fields
        .next()
        .ok_or_else(|| malformed("missing target field".to_string()))?;
    let mut entries: Vec<(u32, f64)> = Vec::new();
    for field in fields {
        let (id, value) = field
            .split_once(':')
            .ok_or_else(|| malformed(format!("expected id:value, got '{}'", field)))?;
        let id: u32 = id
            .parse()
            .map_err(|_| malformed(format!("non-numeric feature id in '{}'", field)))?;
        let value: f64 = value
            .parse()
            .map_err(|_| malformed(format!("non-numeric value in '{}'", field)))?;
        if id == 0 {
            return Err(malformed("svmlight feature ids are 1-based".to_string()));
        }
        entries.push((id - 1, value));
    }
    Ok(SparseVec::from_pairs(entries))
}
