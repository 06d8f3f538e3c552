use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Block;
use crate::error::ChainError;

/// Longest satisfiable prefix: a SHA-256 hex digest has 64 characters.
pub const MAX_DIFFICULTY: u32 = 64;

/// Leading-zero proof of work over a block's hex hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
    prefix: String,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Result<Self, ChainError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(ChainError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(Self {
            difficulty,
            prefix: "0".repeat(difficulty as usize),
        })
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Search nonces 0, 1, 2, ... until the hash carries the required prefix.
    /// Sets the block's nonce and hash and returns the winning hash.
    pub fn mine(&self, block: &mut Block) -> Result<String, ChainError> {
        self.mine_cancellable(block, &AtomicBool::new(false))
    }

    /// Like `mine`, but gives up with `MiningIncomplete` once `cancel` is set.
    /// On failure the block keeps whatever nonce was last tried and must not
    /// be appended.
    pub fn mine_cancellable(
        &self,
        block: &mut Block,
        cancel: &AtomicBool,
    ) -> Result<String, ChainError> {
        let mut nonce: u128 = 0;
        loop {
            if cancel.load(Ordering::Relaxed) {
                debug!("POW - cancelled block #{} at nonce {}", block.index, nonce);
                return Err(ChainError::MiningIncomplete);
            }
            block.nonce = nonce;
            block.hash = block.compute_hash();
            if self.meets_target(&block.hash) {
                return Ok(block.hash.clone());
            }
            nonce = nonce.checked_add(1).ok_or(ChainError::MiningIncomplete)?;
        }
    }

    /// Re-verify a sealed block without searching: its stored hash must match
    /// its contents and carry the required prefix.
    pub fn validate(&self, block: &Block) -> bool {
        let expected = block.compute_hash();
        expected == block.hash && self.meets_target(&expected)
    }

    pub fn meets_target(&self, hash: &str) -> bool {
        hash.starts_with(&self.prefix)
    }
}
