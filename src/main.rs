use axum::{
    extract::State,
    routing::{get, post},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use shore_predictor::config::ServiceConfig;
use shore_predictor::error::PredictError;
use shore_predictor::features::{FeatureVectorizer, DEFAULT_GEOMS};
use shore_predictor::grid::GridRenderer;
use shore_predictor::meta::{ModelMetadata, ServiceMetadata};
use shore_predictor::model::{ResidualModel, TorchResidual};
use shore_predictor::types::{Aggregate, PredictionMeta, PredictionRequest, PredictionResponse};
use shore_predictor::{physics, scorer};

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    model: Arc<dyn ResidualModel>,
    vectorizer: Arc<FeatureVectorizer>,
    renderer: Arc<GridRenderer>,
    thresholds: scorer::Thresholds,
    meta: Arc<ModelMetadata>,
    svc: Arc<ServiceMetadata>,
    log_pred: bool,
}

// ---------- Handlers ----------

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, PredictError> {
    state.svc.record_request();

    req.validate().map_err(PredictError::BadInput)?;

    let now = Utc::now();
    let row = state.vectorizer.vectorize(&req, now);

    if state.log_pred {
        let nz = row.iter().filter(|x| **x != 0.0).count();
        tracing::info!(
            "recv geom={} in_dim={} nonzero={} rainfall={:.1} community={:.2}",
            req.geom_id,
            row.len(),
            nz,
            req.rainfall,
            req.community
        );
    }

    let base = physics::physics_prior(req.rainfall, req.wind, req.tides, req.community);
    let residual = state
        .model
        .infer(&row)
        .map_err(|e| PredictError::Inference(e.to_string()))? as f64;
    let score = scorer::combine(base, residual);

    let cells = state.renderer.render(req.center(), score, &req.geom_id);

    Ok(Json(PredictionResponse {
        cells,
        aggregate: Aggregate {
            risk_score: round3(score),
            risk_class: state.thresholds.classify(score),
            physics_base: round3(base),
            residual: round3(residual),
        },
        meta: PredictionMeta {
            when: req.when,
            backend: "torchscript",
            model_version: state.meta.model_version(),
            model_hash: state.meta.hash.clone(),
        },
    }))
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let features = state.vectorizer.schema().feature_names();
    let geoms = state.vectorizer.geoms();
    Json(json!({
        "ok": true,
        "backend": "torchscript",
        "model_version": state.meta.model_version(),
        "meta": state.meta.provenance_json(&features, geoms),
    }))
}

async fn metrics(State(state): State<AppState>) -> Json<Value> {
    let features = state.vectorizer.schema().feature_names();
    Json(json!({
        "service": "shore_predictor",
        "model": {
            "path": state.meta.path,
            "hash": state.meta.hash,
            "rows": state.meta.sidecar.rows,
            "test_r2": state.meta.sidecar.test_r2,
            "features": state.meta.sidecar.features.as_deref().unwrap_or(&features),
            "geoms": state.meta.sidecar.geoms.as_deref().unwrap_or(state.vectorizer.geoms()),
        },
        "runtime": state.svc.runtime_json(),
    }))
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

// ---------- Startup ----------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = ServiceConfig::from_env();

    // Sidecar + hash first: the sidecar names the schema the artifact was
    // trained against, which fixes the input dim for the load probe.
    let meta = ModelMetadata::load(&cfg.model_path);
    let schema = meta.schema();
    let geoms: Vec<String> = meta
        .sidecar
        .geoms
        .clone()
        .unwrap_or_else(|| DEFAULT_GEOMS.iter().map(|s| s.to_string()).collect());

    // Model load failure is fatal: no serving without a usable backend.
    let model = TorchResidual::load(&cfg.model_path, schema.len())?;
    tracing::info!(
        "loaded model {} hash={} schema={:?} in_dim={} geoms={:?}",
        cfg.model_path,
        meta.hash,
        schema,
        model.in_dim(),
        geoms
    );

    let state = AppState {
        model: Arc::new(model),
        vectorizer: Arc::new(FeatureVectorizer::new(schema, geoms)),
        renderer: Arc::new(GridRenderer::new(meta.grid_params(), meta.thresholds())),
        thresholds: meta.thresholds(),
        meta: Arc::new(meta),
        svc: Arc::new(ServiceMetadata::new()),
        log_pred: cfg.log_pred,
    };

    let app = axum::Router::new()
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state);

    tracing::info!("listening on {}", cfg.bind);
    let listener = tokio::net::TcpListener::bind(cfg.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
