use crate::blockchain::{Block, Blockchain};
use crate::classifier::IrisModel;
use crate::error::ChainError;
use crate::transaction::WireTransaction;
use actix_web::{HttpResponse, web};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Shared application state. The single mutex serializes every chain
/// mutation, mining included.
pub struct AppState {
    pub blockchain: Mutex<Blockchain>,
}

impl AppState {
    pub fn new(difficulty: u32) -> Result<Self, ChainError> {
        let blockchain = Blockchain::new(difficulty, IrisModel::new())?;
        Ok(Self {
            blockchain: Mutex::new(blockchain),
        })
    }
}

/// Run `f` with the chain locked on the blocking pool, so a long mine never
/// parks an async worker on the mutex. A failed worker maps to a 500.
pub async fn with_chain<F, R>(state: &web::Data<AppState>, f: F) -> Result<R, HttpResponse>
where
    F: FnOnce(&mut Blockchain) -> R + Send + 'static,
    R: Send + 'static,
{
    let state = state.clone();
    web::block(move || {
        let mut bc = state.blockchain.lock().expect("mutex poisoned");
        f(&mut *bc)
    })
    .await
    .map_err(|e| {
        error!("chain worker failed: {e}");
        HttpResponse::InternalServerError().body("chain worker failed")
    })
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<WireTransaction>,
    pub hash: String,
    pub previous_hash: String,
    pub nonce: u128,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

#[derive(Deserialize)]
pub struct FlowerRequest {
    pub sender: String,
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub flower_type: String,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct MempoolResponse<'a> {
    pub size: usize,
    pub transactions: &'a [WireTransaction],
}

/* ---------- Model API Models ---------- */

#[derive(Deserialize)]
pub struct PredictRequest {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl PredictRequest {
    pub fn features(&self) -> [f64; 4] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
