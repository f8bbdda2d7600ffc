//! Error handling for bwhuff.
//!
//! Every stage of the pipeline fails fast and hands its error to the caller with `?`.
//! A failure inside one block is wrapped in [`BwhError::Block`] so the top level can
//! report which block and which stage broke.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage, used when reporting a block failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Bwt,
    Mtf,
    Huffman,
    Container,
}
impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Main error type for bwhuff
#[derive(Error, Debug)]
pub enum BwhError {
    /// An empty block was offered to a stage that needs at least one symbol
    #[error("invalid block: a block must contain at least one symbol")]
    InvalidBlock,

    /// BWT primary index outside the last column
    #[error("invalid primary index {index} for a block of {len} symbols")]
    InvalidIndex { index: usize, len: usize },

    /// Inconsistent data found while reversing a stage
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// MTF rank outside the 256 symbol alphabet
    #[error("invalid move-to-front rank {rank}")]
    InvalidRank { rank: usize },

    /// Huffman table that cannot produce a prefix-free tree
    #[error("malformed huffman table: {0}")]
    MalformedTable(String),

    /// Input ended before everything it announced was read
    #[error("truncated stream: {0}")]
    TruncatedStream(String),

    /// Stream header is not ours
    #[error("bad header: {0}")]
    BadHeader(String),

    /// Unusable options
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read {}: {source}", path.display())]
    IoRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    IoWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A block failed somewhere in the pipeline
    #[error("block {index} failed in the {stage} stage: {source}")]
    Block {
        index: usize,
        stage: Stage,
        #[source]
        source: Box<BwhError>,
    },
}

impl BwhError {
    /// Attach the block number and stage to an error raised inside a block.
    pub fn in_block(self, index: usize, stage: Stage) -> Self {
        BwhError::Block {
            index,
            stage,
            source: Box::new(self),
        }
    }
}

/// Result type used throughout bwhuff
pub type Result<T> = std::result::Result<T, BwhError>;
