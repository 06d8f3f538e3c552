pub mod block;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::Blockchain;
pub use pow::{MAX_DIFFICULTY, ProofOfWork};

use chrono::Utc;

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Current Unix time in seconds, microsecond resolution.
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
