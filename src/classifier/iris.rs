use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::ModelUpdate;
use crate::transaction::Species;

/// Neighbours consulted per prediction.
pub const K_NEIGHBORS: usize = 3;

/// k-nearest-neighbour classifier over standardized iris measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrisModel {
    samples: Vec<[f64; 4]>,
    labels: Vec<usize>,
    #[serde(skip)]
    scaler: Scaler,
}

/// Per-feature mean and standard deviation, refit on every new sample.
#[derive(Debug, Clone, PartialEq)]
struct Scaler {
    mean: [f64; 4],
    scale: [f64; 4],
}

impl Default for Scaler {
    fn default() -> Self {
        Self {
            mean: [0.0; 4],
            scale: [1.0; 4],
        }
    }
}

impl Scaler {
    fn fit(samples: &[[f64; 4]]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mut mean = [0.0; 4];
        let mut scale = [1.0; 4];
        for j in 0..4 {
            mean[j] = samples.iter().map(|s| s[j]).sum::<f64>() / n;
            let var = samples.iter().map(|s| (s[j] - mean[j]).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            // constant feature: leave it unscaled
            scale[j] = if std > 0.0 { std } else { 1.0 };
        }
        Self { mean, scale }
    }

    fn transform(&self, x: &[f64; 4]) -> [f64; 4] {
        std::array::from_fn(|j| (x[j] - self.mean[j]) / self.scale[j])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_class: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("Model not trained yet")]
    NotTrained,
    #[error("Invalid features format")]
    InvalidFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub is_trained: bool,
    pub data_points: usize,
    pub classes: Vec<&'static str>,
}

/// Leave-one-out accuracy over the stored samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub samples: usize,
    pub accuracy: Option<f64>,
}

impl IrisModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        !self.samples.is_empty()
    }

    pub fn data_count(&self) -> usize {
        self.samples.len()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            is_trained: self.is_trained(),
            data_points: self.data_count(),
            classes: Species::ALL.iter().map(|s| s.as_str()).collect(),
        }
    }

    pub fn predict(&self, features: [f64; 4]) -> Result<Prediction, PredictError> {
        if !self.is_trained() {
            return Err(PredictError::NotTrained);
        }
        if !features.iter().all(|f| f.is_finite()) {
            return Err(PredictError::InvalidFeatures);
        }
        let votes = self.vote(&self.scaler, &features, None);
        Ok(prediction_from_votes(votes))
    }

    /// Classify each stored sample using all the others.
    pub fn evaluate(&self) -> Evaluation {
        let n = self.samples.len();
        if n < 2 {
            return Evaluation {
                samples: n,
                accuracy: None,
            };
        }
        let correct = (0..n)
            .filter(|&i| {
                let rest: Vec<[f64; 4]> = self
                    .samples
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, s)| *s)
                    .collect();
                let scaler = Scaler::fit(&rest);
                let votes = self.vote(&scaler, &self.samples[i], Some(i));
                argmax(&votes) == self.labels[i]
            })
            .count();
        Evaluation {
            samples: n,
            accuracy: Some(correct as f64 / n as f64),
        }
    }

    /// Snapshot of the training data as JSON.
    pub fn to_snapshot(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Restore from `to_snapshot` output. A snapshot that does not parse
    /// yields an untrained model.
    pub fn from_snapshot(snapshot: &str) -> Self {
        match serde_json::from_str::<IrisModel>(snapshot) {
            Ok(mut model) if model.is_consistent() => {
                model.scaler = Scaler::fit(&model.samples);
                model
            }
            Ok(_) => {
                warn!("MODEL - snapshot has inconsistent samples/labels, starting empty");
                Self::new()
            }
            Err(e) => {
                warn!("MODEL - could not load snapshot: {e}");
                Self::new()
            }
        }
    }

    /// One label per sample, every label a known class, every measurement finite.
    fn is_consistent(&self) -> bool {
        self.samples.len() == self.labels.len()
            && self.labels.iter().all(|&l| l < Species::ALL.len())
            && self.samples.iter().flatten().all(|f| f.is_finite())
    }

    /// Vote counts per class among the k nearest samples, skipping `exclude`.
    fn vote(&self, scaler: &Scaler, x: &[f64; 4], exclude: Option<usize>) -> [usize; 3] {
        let q = scaler.transform(x);
        let mut dists: Vec<(f64, usize)> = self
            .samples
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != exclude)
            .map(|(i, s)| {
                let p = scaler.transform(s);
                let d: f64 = q.iter().zip(p.iter()).map(|(a, b)| (a - b).powi(2)).sum();
                (d, self.labels[i])
            })
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = [0usize; 3];
        for (_, label) in dists.into_iter().take(K_NEIGHBORS) {
            votes[label] += 1;
        }
        votes
    }
}

impl ModelUpdate for IrisModel {
    fn add_data_point(&mut self, features: [f64; 4], label: &str) -> bool {
        if !features.iter().all(|f| f.is_finite()) {
            return false;
        }
        let Ok(species) = label.parse::<Species>() else {
            return false;
        };
        self.samples.push(features);
        self.labels.push(species.index());
        self.scaler = Scaler::fit(&self.samples);
        true
    }
}

/// Index of the highest count; ties go to the lower class index.
fn argmax(votes: &[usize; 3]) -> usize {
    let mut best = 0;
    for (i, &v) in votes.iter().enumerate() {
        if v > votes[best] {
            best = i;
        }
    }
    best
}

fn prediction_from_votes(votes: [usize; 3]) -> Prediction {
    let total = votes.iter().sum::<usize>().max(1) as f64;
    let best = argmax(&votes);
    Prediction {
        predicted_class: Species::ALL[best].as_str().to_string(),
        confidence: votes[best] as f64 / total,
        probabilities: Species::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), votes[s.index()] as f64 / total))
            .collect(),
    }
}
