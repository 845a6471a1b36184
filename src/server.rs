use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use hyper::Server;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::app::ports::SnapshotStore;
use crate::query;
use crate::types::{Snapshot, SnapshotKey};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SnapshotStore>,
    /// Serve this day instead of the local calendar date.
    pub date_override: Option<NaiveDate>,
}

impl AppState {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store,
            date_override: None,
        }
    }

    fn today(&self) -> NaiveDate {
        self.date_override
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn load_today(state: &AppState) -> Result<Snapshot, ApiError> {
    let key = SnapshotKey::for_date(state.today());
    match state.store.load(&key).await {
        Ok(Some(snapshot)) => Ok(snapshot),
        Ok(None) => Err(ApiError::NotFound(format!("No snapshot for {key}"))),
        Err(e) => {
            error!("Snapshot load failed: {}", e);
            Err(ApiError::Internal("Snapshot store unavailable".to_string()))
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Parameter '{name}' is required")))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "showtimes-scraper",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_venues(State(state): State<AppState>) -> Result<Response, ApiError> {
    let snapshot = load_today(&state).await?;
    Ok(Json(query::list_venues(&snapshot)).into_response())
}

async fn venue_items(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
) -> Result<Response, ApiError> {
    let snapshot = load_today(&state).await?;
    let items = query::items_for_venue(&snapshot, &venue_id)
        .ok_or_else(|| ApiError::NotFound(format!("No venue with id '{venue_id}'")))?;
    Ok(Json(items).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ShowtimesParams {
    pub venue: Option<String>,
    pub title: Option<String>,
}

async fn showtimes(
    State(state): State<AppState>,
    Query(params): Query<ShowtimesParams>,
) -> Result<Response, ApiError> {
    let venue = required(params.venue, "venue")?;
    let title = required(params.title, "title")?;
    let snapshot = load_today(&state).await?;
    let found = query::showtimes_for(&snapshot, &venue, &title).ok_or_else(|| {
        ApiError::NotFound(format!("No showtimes for '{title}' at '{venue}'"))
    })?;
    Ok(Json(found).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TitleParams {
    pub title: Option<String>,
}

async fn venues_showing(
    State(state): State<AppState>,
    Query(params): Query<TitleParams>,
) -> Result<Response, ApiError> {
    let title = required(params.title, "title")?;
    let snapshot = load_today(&state).await?;
    let venues = query::venues_showing(&snapshot, &title);
    if venues.is_empty() {
        return Err(ApiError::NotFound(format!("No venue is showing '{title}'")));
    }
    Ok(Json(venues).into_response())
}

/// Create the query router over the snapshot store
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/venues", get(list_venues))
        .route("/venues/:id/items", get(venue_items))
        .route("/showtimes", get(showtimes))
        .route("/venues-showing", get(venues_showing))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
