use log::{debug, warn};

use super::model::{Transaction, WireTransaction};
use crate::error::ChainError;

/// Validated transactions waiting for the next block, in arrival order.
#[derive(Debug, Default)]
pub struct Mempool {
    pending: Vec<WireTransaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `tx` if it validates. Returns `next_block_index`, the block
    /// it will be sealed into.
    pub fn add_transaction(
        &mut self,
        tx: &Transaction,
        next_block_index: u64,
    ) -> Result<u64, ChainError> {
        if let Some(reason) = tx.rejection() {
            warn!(
                "MEMPOOL - rejected {:?} from {:?}: {}",
                tx.tx_type(),
                tx.sender(),
                reason
            );
            return Err(ChainError::InvalidTransaction(reason));
        }
        self.pending.push(tx.to_wire());
        debug!(
            "MEMPOOL - accepted {:?} from {:?} (size={}, block #{})",
            tx.tx_type(),
            tx.sender(),
            self.pending.len(),
            next_block_index
        );
        Ok(next_block_index)
    }

    /// Take everything pending, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<WireTransaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[WireTransaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
