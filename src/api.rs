use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Json, Router,
};
use http::{HeaderValue, StatusCode};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::core::leaderboard::{parse_limit_or_default, ScoreRecord};
use crate::core::submission::ScoreSubmission;
use crate::error::{ScoresError, ScoresResult};
use crate::storage::ScoreStore;

// Local dev origins are always allowed next to the configured frontend.
const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://localhost:3000"];

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    // Kept as raw text: a bad limit falls back to the default instead of failing.
    limit: Option<String>,
}

pub fn router(store: ScoreStore, frontend_origin: &str) -> ScoresResult<Router> {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/scores", get(list_scores).post(submit_score));

    Ok(Router::new()
        .nest("/api", routes)
        .layer(cors_layer(frontend_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(store))
}

fn cors_layer(frontend_origin: &str) -> ScoresResult<CorsLayer> {
    let origins = std::iter::once(frontend_origin)
        .chain(LOCAL_ORIGINS)
        .unique()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| ScoresError::Config(format!("invalid frontend origin '{origin}': {e}")))
        })
        .collect::<ScoresResult<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_scores(
    State(store): State<ScoreStore>,
    query: Result<Query<ScoresQuery>, QueryRejection>,
) -> Json<Vec<ScoreRecord>> {
    let raw_limit = query.ok().and_then(|Query(q)| q.limit);
    let limit = parse_limit_or_default(raw_limit.as_deref());
    Json(store.query(limit))
}

async fn submit_score(
    State(store): State<ScoreStore>,
    payload: Result<Json<ScoreSubmission>, JsonRejection>,
) -> ScoresResult<(StatusCode, Json<ScoreRecord>)> {
    let Json(submission) = payload.inspect_err(|rejection| {
        warn!("Rejected score payload: {}", rejection.body_text());
    })?;

    let record = submission
        .score()
        .and_then(|score| store.submit(&submission.name, score))
        .inspect_err(|reason| warn!("Rejected score submission: {reason}"))?;

    debug!("Stored score {} for {}", record.score, record.name);
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn serve(settings: &Settings, store: ScoreStore) -> ScoresResult<()> {
    let app = router(store, &settings.frontend_origin)?;
    let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received."),
        Err(e) => {
            // Without a signal handler, keep serving until the process is killed.
            error!("Unable to listen for shutdown signal: {e}");
            std::future::pending::<()>().await
        }
    }
}
