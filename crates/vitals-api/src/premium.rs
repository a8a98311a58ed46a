//! Insurance premium routes: `GET /`, `GET /health`, `POST /predict`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use vitals_config::PremiumConfig;
use vitals_contracts::{
    premium::{PredictionResponse, PremiumInput},
    verify::RequestKind,
};
use vitals_core::traits::{PremiumModel, RequestVerifier};
use vitals_premium::{derive_features, CityTiers};

use crate::error::{no_route, ApiResult};
use crate::middleware::request_span;
use crate::patient::parse_body;

pub const WELCOME: &str = "Welcome to the Insurance Premium Category Predictor API!";

/// Router state for the premium predictor.
#[derive(Clone)]
pub struct PremiumApi {
    model: Arc<dyn PremiumModel>,
    verifier: Arc<dyn RequestVerifier>,
    tiers: Arc<CityTiers>,
}

impl PremiumApi {
    pub fn new(
        model: Box<dyn PremiumModel>,
        verifier: Box<dyn RequestVerifier>,
        tiers: CityTiers,
    ) -> Self {
        Self {
            model: Arc::from(model),
            verifier: Arc::from(verifier),
            tiers: Arc::new(tiers),
        }
    }

    /// Build with the city tiers listed in `config`.
    pub fn from_config(
        model: Box<dyn PremiumModel>,
        verifier: Box<dyn RequestVerifier>,
        config: &PremiumConfig,
    ) -> Self {
        let tiers = CityTiers::new(&config.tier_1_cities, &config.tier_2_cities);
        Self::new(model, verifier, tiers)
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(welcome))
            .route("/health", get(health))
            .route("/predict", post(predict))
            .fallback(no_route)
            .with_state(self)
            .layer(middleware::from_fn(request_span))
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME }))
}

async fn health(State(api): State<PremiumApi>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": api.model.version(),
        "model_loaded": true,
    }))
}

async fn predict(
    State(api): State<PremiumApi>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let report = api.verifier.verify(RequestKind::PremiumInput, &body)?;
    if !report.passed {
        return Err(report.into());
    }

    let input: PremiumInput = parse_body(body)?;
    let features = derive_features(&input, &api.tiers)?;
    let prediction = api.model.predict(&features)?;

    info!(
        category = %prediction.predicted_category,
        confidence = ?prediction.confidence(),
        model_version = api.model.version(),
        "premium predicted"
    );
    Ok(Json(
        json!({ "response": PredictionResponse::from(prediction) }),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
