use thiserror::Error;

/// Errors surfaced by chain-mutating operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(&'static str),

    /// Mining stopped before a nonce was found. Nothing was appended
    /// and the mempool still holds every pending transaction.
    #[error("mining did not complete")]
    MiningIncomplete,

    #[error("difficulty {difficulty} out of range (max {max})")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },
}

/// First rule a stored chain breaks, as reported by `Blockchain::check_chain`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainIntegrityViolation {
    #[error("block #{index}: previous_hash does not match the preceding block's hash")]
    BrokenLink { index: usize },

    #[error("block #{index}: expected index {expected}, found {found}")]
    IndexGap {
        index: usize,
        expected: u64,
        found: u64,
    },

    #[error("block #{index}: stored hash does not match its contents")]
    HashMismatch { index: usize },

    #[error("block #{index}: hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { index: usize, difficulty: u32 },
}
