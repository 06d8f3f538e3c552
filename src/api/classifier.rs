use actix_web::{HttpResponse, Responder, get, post, web};

use super::models::{AppState, ErrorResponse, PredictRequest, with_chain};
use crate::classifier::PredictError;

#[post("/flower/predict/")]
pub async fn predict_flower(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> impl Responder {
    let features = body.features();
    let prediction = match with_chain(&state, move |bc| bc.model().predict(features)).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match prediction {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e @ PredictError::NotTrained) => {
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: e.to_string(),
            })
        }
        Err(e @ PredictError::InvalidFeatures) => HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}

#[get("/model/info/")]
pub async fn model_info(state: web::Data<AppState>) -> impl Responder {
    match with_chain(&state, |bc| bc.model().info()).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(resp) => resp,
    }
}

/// Leave-one-out accuracy of the current model. Runs on a copy so the chain
/// lock is only held for the clone.
#[get("/model/evaluate/")]
pub async fn evaluate_model(state: web::Data<AppState>) -> impl Responder {
    let model = match with_chain(&state, |bc| bc.model().clone()).await {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    match web::block(move || model.evaluate()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(_) => HttpResponse::InternalServerError().body("evaluation failed"),
    }
}

/// Current model as a JSON snapshot.
#[get("/model/snapshot/")]
pub async fn get_model_snapshot(state: web::Data<AppState>) -> impl Responder {
    match with_chain(&state, |bc| bc.serialize_model()).await {
        Ok(snapshot) => HttpResponse::Ok()
            .content_type("application/json")
            .body(snapshot),
        Err(resp) => resp,
    }
}

/// Replace the model with a snapshot from `/model/snapshot/`.
#[post("/model/load/")]
pub async fn load_model(state: web::Data<AppState>, body: String) -> impl Responder {
    let loaded = with_chain(&state, move |bc| {
        bc.load_model(&body);
        bc.model().info()
    })
    .await;
    match loaded {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(resp) => resp,
    }
}
