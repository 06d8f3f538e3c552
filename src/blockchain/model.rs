use log::{debug, info};
use std::sync::atomic::AtomicBool;

use super::{Block, GENESIS_PREVIOUS_HASH, ProofOfWork, now_timestamp};
use crate::classifier::{IrisModel, ModelUpdate};
use crate::error::{ChainError, ChainIntegrityViolation};
use crate::transaction::{Mempool, Transaction};

/// In-memory chain with its mempool, Proof-of-Work engine and the model
/// notified of every sealed data sample.
#[derive(Debug)]
pub struct Blockchain<M = IrisModel> {
    chain: Vec<Block>,
    mempool: Mempool,
    pow: ProofOfWork,
    model: M,
}

impl<M: ModelUpdate> Blockchain<M> {
    /// Initialize a new blockchain with a mined genesis block.
    pub fn new(difficulty: u32, model: M) -> Result<Self, ChainError> {
        let mut bc = Self {
            chain: Vec::new(),
            mempool: Mempool::new(),
            pow: ProofOfWork::new(difficulty)?,
            model,
        };
        bc.create_genesis_block()?;
        Ok(bc)
    }

    fn create_genesis_block(&mut self) -> Result<(), ChainError> {
        let mut genesis = Block::new(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            now_timestamp(),
            Vec::new(),
        );
        self.pow.mine(&mut genesis)?;
        info!("CHAIN - genesis sealed (hash={})", genesis.hash);
        self.chain.push(genesis);
        Ok(())
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Queue a transaction for the next block. Returns that block's index.
    pub fn add_transaction(&mut self, tx: &Transaction) -> Result<u64, ChainError> {
        let next_index = self.last_block().index + 1;
        self.mempool.add_transaction(tx, next_index)
    }

    /// Build and queue a data-sample transaction.
    pub fn add_flower_data(
        &mut self,
        sender: &str,
        features: [f64; 4],
        flower_type: &str,
    ) -> Result<u64, ChainError> {
        self.add_transaction(&Transaction::data_sample(sender, features, flower_type))
    }

    /// Mine the mempool's contents into a new block and append it.
    pub fn add_block(&mut self) -> Result<&Block, ChainError> {
        self.add_block_cancellable(&AtomicBool::new(false))
    }

    /// All-or-nothing: if mining is cancelled the mempool and chain are
    /// left exactly as they were.
    pub fn add_block_cancellable(&mut self, cancel: &AtomicBool) -> Result<&Block, ChainError> {
        let last = self.last_block();
        let mut block = Block::new(
            last.index + 1,
            last.hash.clone(),
            now_timestamp(),
            self.mempool.pending().to_vec(),
        );
        self.pow.mine_cancellable(&mut block, cancel)?;

        let drained = self.mempool.drain();
        debug_assert_eq!(drained, block.transactions);
        info!(
            "CHAIN - sealed block #{} (txs={}, nonce={}, hash={})",
            block.index,
            block.transactions.len(),
            block.nonce,
            block.hash
        );
        self.chain.push(block);
        self.notify_model();
        Ok(self.last_block())
    }

    /// Hand every data sample in the newest block to the model. The model's
    /// answer does not affect the chain.
    fn notify_model(&mut self) {
        let Some(block) = self.chain.last() else {
            return;
        };
        for sample in block.transactions.iter().filter_map(|tx| tx.data_sample()) {
            let accepted = self
                .model
                .add_data_point(sample.features(), &sample.flower_type);
            debug!(
                "MODEL - block #{} sample {:?} ({}) accepted={}",
                block.index,
                sample.features(),
                sample.flower_type,
                accepted
            );
        }
    }

    /// Walk the chain from block 1 and report the first broken rule.
    pub fn check_chain(&self) -> Result<(), ChainIntegrityViolation> {
        for (i, pair) in self.chain.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            let index = i + 1;

            if current.previous_hash != prev.hash {
                return Err(ChainIntegrityViolation::BrokenLink { index });
            }
            if current.index != prev.index + 1 {
                return Err(ChainIntegrityViolation::IndexGap {
                    index,
                    expected: prev.index + 1,
                    found: current.index,
                });
            }
            if !self.pow.validate(current) {
                return Err(if current.compute_hash() != current.hash {
                    ChainIntegrityViolation::HashMismatch { index }
                } else {
                    ChainIntegrityViolation::DifficultyNotMet {
                        index,
                        difficulty: self.pow.difficulty(),
                    }
                });
            }
        }
        Ok(())
    }

    pub fn validate_chain(&self) -> bool {
        self.check_chain().is_ok()
    }
}

impl Blockchain<IrisModel> {
    /// Snapshot of the classifier trained from sealed samples.
    pub fn serialize_model(&self) -> String {
        self.model.to_snapshot()
    }

    /// Replace the classifier with one restored from `serialize_model` output.
    /// An unreadable snapshot leaves an untrained model.
    pub fn load_model(&mut self, snapshot: &str) {
        self.model = IrisModel::from_snapshot(snapshot);
        info!(
            "MODEL - loaded snapshot ({} data points)",
            self.model.data_count()
        );
    }
}
