mod chain;
mod classifier;
mod health;
pub mod models;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::mine_block)
            .service(tx::post_transaction)
            .service(tx::post_flower)
            .service(tx::get_mempool)
            .service(classifier::predict_flower)
            .service(classifier::model_info)
            .service(classifier::evaluate_model)
            .service(classifier::get_model_snapshot)
            .service(classifier::load_model),
    );
}

#[cfg(test)]
mod tests {
    use super::{AppState, init_routes};
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(init_routes)).await
        };
    }

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(1).unwrap())
    }

    #[actix_web::test]
    async fn health() {
        let app = app!(state());
        let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn submit_mine_and_fetch_chain() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({"sender": "Alice", "recipient": "Bob", "amount": 10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["index"], 1);

        let req = test::TestRequest::post()
            .uri("/api/v1/flower/add/")
            .set_json(json!({
                "sender": "lab",
                "sepal_length": 4.9,
                "sepal_width": 3.0,
                "petal_length": 1.4,
                "petal_width": 0.2,
                "flower_type": "setosa"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/v1/mempool/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["size"], 2);

        let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
        let mined: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(mined["index"], 1);
        assert_eq!(mined["transactions"].as_array().map(Vec::len), Some(2));
        assert!(mined["hash"].as_str().unwrap().starts_with('0'));

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let chain: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(chain["length"], 2);
        assert_eq!(chain["chain"][1]["previous_hash"], chain["chain"][0]["hash"]);
        assert_eq!(chain["chain"][1]["hash"], mined["hash"]);

        let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
        let valid: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(valid["valid"], true);
        assert!(valid.get("reason").is_none());

        let req = test::TestRequest::get().uri("/api/v1/model/info/").to_request();
        let info: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(info["is_trained"], true);
        assert_eq!(info["data_points"], 1);

        let req = test::TestRequest::post()
            .uri("/api/v1/flower/predict/")
            .set_json(json!({
                "sepal_length": 5.0,
                "sepal_width": 3.1,
                "petal_length": 1.5,
                "petal_width": 0.2
            }))
            .to_request();
        let prediction: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(prediction["predicted_class"], "setosa");
    }

    #[actix_web::test]
    async fn rejects_invalid_transactions() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({"sender": "Alice", "recipient": "Bob", "amount": -5}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/flower/add/")
            .set_json(json!({
                "sender": "lab",
                "sepal_length": 4.9,
                "sepal_width": 3.0,
                "petal_length": 1.4,
                "petal_width": 0.2,
                "flower_type": "daisy"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        assert!(state.blockchain.lock().unwrap().mempool().is_empty());
    }

    #[actix_web::test]
    async fn untrained_prediction() {
        let app = app!(state());
        let req = test::TestRequest::post()
            .uri("/api/v1/flower/predict/")
            .set_json(json!({
                "sepal_length": 5.0,
                "sepal_width": 3.1,
                "petal_length": 1.5,
                "petal_width": 0.2
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Model not trained yet");
    }

    #[actix_web::test]
    async fn snapshot_round_trip_over_http() {
        let trained = state();
        trained
            .blockchain
            .lock()
            .unwrap()
            .add_flower_data("lab", [4.9, 3.0, 1.4, 0.2], "setosa")
            .unwrap();
        trained.blockchain.lock().unwrap().add_block().unwrap();
        let app = app!(trained);
        let req = test::TestRequest::get().uri("/api/v1/model/snapshot/").to_request();
        let snapshot = test::call_and_read_body(&app, req).await;

        let fresh = state();
        let app = app!(fresh);
        let req = test::TestRequest::post()
            .uri("/api/v1/model/load/")
            .set_payload(snapshot)
            .to_request();
        let info: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(info["data_points"], 1);
        assert_eq!(info["is_trained"], true);
    }

    #[actix_web::test]
    async fn waiting_for_the_chain_does_not_stall_the_worker() {
        use actix_web::rt;
        use std::sync::mpsc;
        use std::time::{Duration, Instant};

        let state = state();
        let app = app!(state);

        let (locked_tx, locked_rx) = mpsc::channel();
        let holder = {
            let state = state.clone();
            std::thread::spawn(move || {
                let _guard = state.blockchain.lock().unwrap();
                locked_tx.send(()).unwrap();
                std::thread::sleep(Duration::from_millis(400));
                Instant::now()
            })
        };
        locked_rx.recv().unwrap();

        let ticker = rt::spawn(async {
            rt::time::sleep(Duration::from_millis(20)).await;
            Instant::now()
        });
        let req = test::TestRequest::get().uri("/api/v1/mempool/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let ticked_at = ticker.await.unwrap();
        let released_at = holder.join().unwrap();
        assert!(ticked_at < released_at);
    }

    #[actix_web::test]
    async fn evaluate_empty_model() {
        let app = app!(state());
        let req = test::TestRequest::get().uri("/api/v1/model/evaluate/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["samples"], 0);
        assert_eq!(body["accuracy"], Value::Null);
    }
}
