use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{AppState, ChainResponse, MineResponse, ValidateResponse, with_chain};

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let snapshot = with_chain(&state, |bc| (bc.difficulty(), bc.blocks().to_vec())).await;
    let (difficulty, chain) = match snapshot {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        difficulty,
        chain: &chain,
    })
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let checked = with_chain(&state, |bc| (bc.check_chain(), bc.len())).await;
    let (check, length) = match checked {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(ValidateResponse {
        valid: check.is_ok(),
        length,
        reason: check.err().map(|v| v.to_string()),
    })
}

/// Seal the mempool into a new block. The search holds the chain lock on the
/// blocking pool until a nonce is found.
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    let mined = match with_chain(&state, |bc| bc.add_block().cloned()).await {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match mined {
        Ok(block) => {
            info!(
                "MINER - block #{} forged with {} txs",
                block.index,
                block.transactions.len()
            );
            HttpResponse::Ok().json(MineResponse {
                message: "New block forged",
                index: block.index,
                transactions: block.transactions,
                hash: block.hash,
                previous_hash: block.previous_hash,
                nonce: block.nonce,
            })
        }
        Err(e) => {
            error!("MINER - {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}
