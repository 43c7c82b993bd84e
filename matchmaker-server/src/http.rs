//! HTTP transport for the four RPC operations of §6. The wire schema is
//! ours to pick (the spec treats it as an external IDL's concern); this
//! picks plain JSON bodies over Axum, the same shape the teacher's
//! `gateway` crate uses for its own HTTP surface.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use tower_http::trace::TraceLayer;
use tracing::error;

use matchmaker_core::{Engine, EngineError, PlayerProfile};

pub const HEALTHZ_PATH: &str = "/healthz";
pub const METRICS_PATH: &str = "/metrics";
pub const QUEUE_PATH: &str = "/queue";
pub const PLAYERS_PATH: &str = "/players";

/// How often `StreamMatches` polls the delivery buffer (§6: "≈200ms").
const STREAM_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn build_router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route(HEALTHZ_PATH, get(healthz))
        .route(METRICS_PATH, get(metrics))
        .route(QUEUE_PATH, get(get_queue))
        .route(PLAYERS_PATH, post(enqueue))
        .route("/players/:id", delete(cancel))
        .route("/players/:id/matches", get(stream_matches))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> impl IntoResponse {
    axum::http::StatusCode::OK
}

#[derive(serde::Serialize)]
struct EnqueueResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `Enqueue(Player) -> {success: bool}` (§6).
async fn enqueue(
    State(engine): State<Arc<Engine>>,
    Json(profile): Json<PlayerProfile>,
) -> impl IntoResponse {
    match engine.enqueue(profile).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(EnqueueResponse { success: true, error: None }),
        ),
        Err(err @ EngineError::InvalidPlayer { .. }) => (
            axum::http::StatusCode::BAD_REQUEST,
            Json(EnqueueResponse { success: false, error: Some(err.to_string()) }),
        ),
        Err(err @ EngineError::AlreadyQueued { .. }) => (
            axum::http::StatusCode::CONFLICT,
            Json(EnqueueResponse { success: false, error: Some(err.to_string()) }),
        ),
        Err(err) => {
            error!(%err, "enqueue: unexpected engine error");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(EnqueueResponse { success: false, error: Some(err.to_string()) }),
            )
        }
    }
}

#[derive(serde::Serialize)]
struct CancelResponse {
    success: bool,
}

/// `Cancel(PlayerID) -> {success: bool}` (§6). Absence is not an error
/// (§7): the response is just `success: false`.
async fn cancel(State(engine): State<Arc<Engine>>, Path(id): Path<String>) -> impl IntoResponse {
    let success = engine.cancel(&id).await;
    Json(CancelResponse { success })
}

/// `GetQueue(_) -> QueueSnapshot` (§6).
async fn get_queue(State(engine): State<Arc<Engine>>) -> impl IntoResponse {
    Json(engine.queue_snapshot().await)
}

/// `GetMetrics(_) -> EngineMetrics` (§6), rendered as Prometheus text
/// exposition rather than a bespoke JSON shape, matching the teacher's
/// `/metrics` convention across every service.
async fn metrics() -> impl IntoResponse {
    match matchmaker_core::metrics::render() {
        Ok(body) => axum::response::Response::builder()
            .status(axum::http::StatusCode::OK)
            .header(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(axum::body::Body::from(body))
            .unwrap(),
        Err(err) => {
            error!(%err, "metrics encode failed");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `StreamMatches(PlayerID) -> stream<Match>` (§6): polls the delivery
/// buffer at `STREAM_POLL_INTERVAL` and terminates the stream once at
/// least one match has been delivered. A client disconnect drops the SSE
/// body and is indistinguishable from a completed stream on our side
/// (§7's "transport-level cancellation: normal termination").
async fn stream_matches(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = futures::stream::unfold((engine, id, false), |(engine, id, done)| async move {
        if done {
            return None;
        }
        loop {
            tokio::time::sleep(STREAM_POLL_INTERVAL).await;
            let matches = engine.drain_matches(&id).await;
            if matches.is_empty() {
                continue;
            }
            let event = Event::default()
                .json_data(&matches)
                .unwrap_or_else(|_| Event::default());
            return Some((Ok(event), (engine, id, true)));
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
