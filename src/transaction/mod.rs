pub mod mempool;
pub mod model;

pub use mempool::Mempool;
pub use model::{MODEL_RECIPIENT, SampleData, Species, Transaction, TxKind, TxType, WireTransaction};
