use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, FlowerRequest, MempoolResponse, NewTxRequest, NewTxResponse, with_chain,
};
use crate::error::ChainError;
use crate::transaction::Transaction;

/// Submit a transfer into the mempool.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let tx = Transaction::transfer(body.sender.trim(), body.recipient.trim(), body.amount);
    submit(&state, tx, "Transaction").await
}

/// Submit a labelled flower measurement for the model.
#[post("/flower/add/")]
pub async fn post_flower(
    state: web::Data<AppState>,
    body: web::Json<FlowerRequest>,
) -> impl Responder {
    let tx = Transaction::data_sample(
        body.sender.trim(),
        [
            body.sepal_length,
            body.sepal_width,
            body.petal_length,
            body.petal_width,
        ],
        body.flower_type.trim(),
    );
    submit(&state, tx, "Flower data").await
}

/// List the pending (not yet mined) transactions.
#[get("/mempool/")]
pub async fn get_mempool(state: web::Data<AppState>) -> impl Responder {
    let pending = match with_chain(&state, |bc| bc.mempool().pending().to_vec()).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(MempoolResponse {
        size: pending.len(),
        transactions: &pending,
    })
}

async fn submit(state: &web::Data<AppState>, tx: Transaction, what: &str) -> HttpResponse {
    let sender = tx.sender().to_string();
    let result = match with_chain(state, move |bc| bc.add_transaction(&tx)).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match result {
        Ok(index) => {
            info!("{what} from {sender:?} queued for block #{index}");
            HttpResponse::Created().json(NewTxResponse {
                message: format!("{what} will be added to Block {index}"),
                index,
            })
        }
        Err(e @ ChainError::InvalidTransaction(_)) => {
            warn!("{what} from {sender:?} rejected: {e}");
            HttpResponse::BadRequest().body(e.to_string())
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
