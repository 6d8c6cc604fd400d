use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use voyage_core::{
    Catalog, Contact, Event as VoyageEvent, EventEnvelope, StatusReport, TickStatus,
};

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/status", get(status_handler))
        .route("/api/v1/contacts", get(contacts_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/save", post(save_handler))
        .route("/api/v1/pause", post(pause_handler))
        .route("/api/v1/resume", post(resume_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    let paused = app_state.paused.load(Ordering::Relaxed);
    Json(serde_json::json!({
        "tick": sim.ship.meta.tick,
        "seed": sim.ship.meta.seed,
        "content_version": sim.ship.meta.content_version,
        "ship": sim.ship.name,
        "lost": sim.status != TickStatus::Continue,
        "time_scale": app_state.time_scale,
        "paused": paused,
    }))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let sim = app_state.sim.lock();
    match voyage_world::encode_snapshot(&sim.ship, &sim.catalog) {
        Ok(json) => {
            drop(sim);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err:#}");
            drop(sim);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn status_handler(State(app_state): State<AppState>) -> Json<StatusReport> {
    let sim = app_state.sim.lock();
    Json(voyage_core::summarize(&sim.ship, &sim.catalog, &sim.content))
}

pub async fn contacts_handler(State(app_state): State<AppState>) -> Json<Vec<Contact>> {
    let sim = app_state.sim.lock();
    Json(sim.catalog.all_contacts().into_iter().cloned().collect())
}

pub async fn save_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    match app_state.save(None) {
        Ok(Some((path, tick))) => (
            StatusCode::OK,
            Json(serde_json::json!({"path": path.display().to_string(), "tick": tick})),
        ),
        Ok(None) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "no save directory configured"})),
        ),
        Err(err) => {
            tracing::error!("save failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("{err:#}")})),
            )
        }
    }
}

pub async fn pause_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    set_paused(&app_state, true)
}

pub async fn resume_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    set_paused(&app_state, false)
}

/// A lost ship has nothing left to pause or resume.
fn set_paused(app_state: &AppState, paused: bool) -> (StatusCode, Json<serde_json::Value>) {
    let sim = app_state.sim.lock();
    let tick = sim.ship.meta.tick;
    if sim.status != TickStatus::Continue {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "ship lost", "tick": tick})),
        );
    }
    drop(sim);
    let was = app_state.paused.swap(paused, Ordering::Relaxed);
    if was != paused {
        tracing::info!(tick, paused, "voyage clock toggled");
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({"paused": paused, "tick": tick})),
    )
}

/// Server-sent voyage feed.
///
/// Opens with a `status` frame, then sends one frame per event keyed by its
/// event id: `log` for ship's logs and galleries, `event` for everything
/// else. A subscriber that falls behind gets a fresh `status` frame in place
/// of the events it missed. The feed ends after the `lost` frame.
pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let report = {
            let sim = sim.lock();
            voyage_core::summarize(&sim.ship, &sim.catalog, &sim.content)
        };
        yield Ok(status_frame(&report));
        'feed: loop {
            match rx.recv().await {
                Ok(events) => {
                    for envelope in &events {
                        yield Ok(envelope_frame(envelope));
                        if matches!(envelope.event, VoyageEvent::ShipLost { .. }) {
                            break 'feed;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "stream subscriber lagged, resyncing");
                    let report = {
                        let sim = sim.lock();
                        voyage_core::summarize(&sim.ship, &sim.catalog, &sim.content)
                    };
                    yield Ok(status_frame(&report));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("underway"),
    )
}

fn envelope_frame(envelope: &EventEnvelope) -> Event {
    let kind = match envelope.event {
        VoyageEvent::LogEntry { .. } | VoyageEvent::Gallery { .. } => "log",
        VoyageEvent::ShipLost { .. } => "lost",
        _ => "event",
    };
    Event::default()
        .event(kind)
        .id(envelope.id.0.clone())
        .data(serde_json::to_string(envelope).unwrap_or_default())
}

fn status_frame(report: &StatusReport) -> Event {
    Event::default()
        .event("status")
        .data(serde_json::to_string(report).unwrap_or_default())
}
