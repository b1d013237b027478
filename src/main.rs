use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::Json;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use gridcast::config::ServerConfig;
use gridcast::types::{FeatureVector, ForecastRequest, RaceForecast};
use gridcast::{assemble, Engine, HistoryStore, ModelArtifact, PredictError};

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
    history: Arc<HistoryStore>,
    predictions_served: Arc<AtomicU64>,
}

// ---------- Request/Response types ----------

#[derive(Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

const DEFAULT_HISTORY_PAGE: usize = 20;

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    model_loaded: bool,
    mode: &'static str,
    predictions_served: u64,
}

// ---------- Handlers ----------

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<ForecastRequest>,
) -> Result<Json<RaceForecast>, PredictError> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let forecast = assemble(&state.engine, &req.track, &req.weather, &req.drivers, now_ms)?;

    tracing::info!(
        "forecast track={} drivers={} mode={} podium={:?}",
        forecast.track,
        forecast.entries.len(),
        state.engine.mode(),
        forecast.podium
    );

    state.history.append(forecast.clone());
    state.predictions_served.fetch_add(1, Ordering::Relaxed);

    Ok(Json(forecast))
}

async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<RaceForecast>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_PAGE);
    Json(state.history.list(limit))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        model_loaded: state.engine.model_loaded(),
        mode: state.engine.mode(),
        predictions_served: state.predictions_served.load(Ordering::Relaxed),
    })
}

// ---------- Startup ----------

/// Missing artifact files are not an error: the engine falls back to the
/// heuristic. A present-but-corrupt artifact aborts startup instead.
fn load_artifact(cfg: &ServerConfig) -> anyhow::Result<Option<ModelArtifact>> {
    let (model_path, meta_path) = match (&cfg.model_path, &cfg.meta_path) {
        (Some(m), Some(meta)) => (m, meta),
        _ => {
            tracing::info!("MODEL_PATH/META_PATH not set; serving heuristic predictions");
            return Ok(None);
        }
    };

    if !Path::new(model_path).exists() || !Path::new(meta_path).exists() {
        tracing::info!(
            "model artifact not found at {} / {}; serving heuristic predictions",
            model_path,
            meta_path
        );
        return Ok(None);
    }

    let artifact = ModelArtifact::load(model_path, meta_path)?;
    if let Some(acc) = artifact.meta().train_accuracy {
        tracing::info!("loaded model artifact from {} (train accuracy {:.3})", model_path, acc);
    } else {
        tracing::info!("loaded model artifact from {}", model_path);
    }
    Ok(Some(artifact))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = ServerConfig::from_env();
    let artifact = load_artifact(&cfg)?;
    let engine = Engine::new(artifact);

    // Warmup on a neutral mid-pack vector; a broken engine fails here
    // instead of on the first request.
    engine.predict(&FeatureVector {
        qualifying_position: 10.0,
        driver_rating: 0.5,
        team_performance: 0.5,
        weather_dry: 1.0,
        track_temperature: 25.0,
        tire_strategy: 1.0,
    })?;
    tracing::info!("warmup prediction ok (mode={})", engine.mode());

    let history = match cfg.history_limit {
        Some(cap) => HistoryStore::with_cap(cap),
        None => HistoryStore::new(),
    };

    let state = AppState {
        engine: Arc::new(engine),
        history: Arc::new(history),
        predictions_served: Arc::new(AtomicU64::new(0)),
    };

    let app = axum::Router::new()
        .route("/api/predict", post(predict))
        .route("/api/history", get(list_history))
        .route("/health", get(health))
        .with_state(state);

    tracing::info!("listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
