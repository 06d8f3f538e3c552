pub mod iris;

pub use iris::{Evaluation, IrisModel, ModelInfo, PredictError, Prediction};

/// Receives data samples from newly sealed blocks.
pub trait ModelUpdate {
    /// Learn from one labelled sample. Returns whether it was accepted;
    /// the chain only logs the answer.
    fn add_data_point(&mut self, features: [f64; 4], label: &str) -> bool;
}
