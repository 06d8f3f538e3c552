use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::transaction::WireTransaction;

/// A batch of transactions linked to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: f64, // Unix seconds (UTC), microsecond resolution
    pub transactions: Vec<WireTransaction>,
    pub nonce: u128,  // Proof-of-Work nonce
    pub hash: String, // Cached hash of the block
}

impl Block {
    /// Create an unsealed block (nonce 0). Seal it with `ProofOfWork::mine`.
    pub fn new(
        index: u64,
        previous_hash: String,
        timestamp: f64,
        transactions: Vec<WireTransaction>,
    ) -> Self {
        let mut block = Self {
            index,
            previous_hash,
            timestamp,
            transactions,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 over `index:previous_hash:timestamp:transactions:nonce`,
    /// lowercase hex. Transactions are serialized as JSON in stored order;
    /// the `hash` field itself is excluded.
    pub fn compute_hash(&self) -> String {
        let txs_json = serde_json::to_string(&self.transactions).expect("serialize txs");
        let preimage = format!(
            "{}:{}:{}:{}:{}",
            self.index, self.previous_hash, self.timestamp, txs_json, self.nonce
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::Transaction;

    fn sample_block() -> Block {
        let txs = vec![
            Transaction::transfer("Alice", "Bob", 10.0).to_wire(),
            Transaction::data_sample("lab", [4.9, 3.0, 1.4, 0.2], "setosa").to_wire(),
        ];
        Block::new(1, "0".repeat(64), 1_700_000_000.25, txs)
    }

    #[test]
    fn new_block_hash_matches_contents() {
        let b = sample_block();
        assert_eq!(b.nonce, 0);
        assert_eq!(b.hash, b.compute_hash());
        assert_eq!(b.hash.len(), 64);
        assert!(b.hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn known_preimage_digest() {
        let b = Block::new(0, "0".repeat(64), 0.5, Vec::new());
        // sha256("0:000...000:0.5:[]:0")
        let preimage = format!("0:{}:0.5:[]:0", "0".repeat(64));
        use sha2::{Digest, Sha256};
        assert_eq!(b.hash, hex::encode(Sha256::digest(preimage.as_bytes())));
    }

    #[test]
    fn hash_is_order_sensitive() {
        let mut b = sample_block();
        let before = b.compute_hash();
        b.transactions.reverse();
        assert_ne!(before, b.compute_hash());
    }

    #[test]
    fn every_field_feeds_the_hash() {
        let base = sample_block();
        let original = base.compute_hash();

        let mut b = base.clone();
        b.nonce += 1;
        assert_ne!(original, b.compute_hash());

        let mut b = base.clone();
        b.index += 1;
        assert_ne!(original, b.compute_hash());

        let mut b = base.clone();
        b.previous_hash = "f".repeat(64);
        assert_ne!(original, b.compute_hash());

        let mut b = base;
        b.timestamp += 1.0;
        assert_ne!(original, b.compute_hash());
    }

    #[test]
    fn serialized_form_round_trips() {
        let b = sample_block();
        let json = serde_json::to_string(&b).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert_eq!(back.compute_hash(), b.hash);
    }
}
