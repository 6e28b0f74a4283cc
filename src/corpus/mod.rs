pub mod matrix_market;
pub mod memory;
pub mod svmlight;
pub mod text;

pub use matrix_market::{MatrixMarketCorpus, MatrixMarketWriter};
pub use memory::MemoryCorpus;
pub use svmlight::{SvmLightCorpus, SvmLightWriter};
pub use text::{BowStream, TextCorpus};

use num::Num;

use crate::error::Result;
use crate::sparse::SparseVec;

/// The streaming corpus contract: a corpus only has to return one document
/// vector at a time.
///
/// `try_iter` starts a fresh, finite pass over the corpus from the first
/// document. Passes are independent: each one acquires its own source
/// handle and shares no position state with any other, so a corpus may be
/// iterated twice in a row, or twice at once, and yields the same
/// sequence both times (given an unchanged backing source). Dropping the
/// iterator early releases whatever the pass had acquired.
pub trait VectorCorpus<N>
where
    N: Num + Copy,
{
    type Iter: Iterator<Item = Result<SparseVec<N>>>;

    /// Open a fresh pass over the corpus.
    fn try_iter(&self) -> Result<Self::Iter>;
}
