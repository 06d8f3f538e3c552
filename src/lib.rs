//! Single-node ledger that seals typed transactions into proof-of-work
//! blocks and feeds sealed flower samples to an iris classifier.

pub mod api;
pub mod blockchain;
pub mod classifier;
pub mod config;
pub mod error;
pub mod transaction;
