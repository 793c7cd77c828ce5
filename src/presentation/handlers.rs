// HTTP request handlers
use crate::application::page_session::{BoardSnapshot, Selection};
use crate::domain::date_range::{parse_date, DateRange, RangeError};
use crate::domain::panel::PanelUpdate;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Date range as sent by the selector. Missing sides fall back to the
/// default range.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    pub fn resolve(&self, default: DateRange) -> Result<DateRange, RangeError> {
        let start = match &self.start {
            Some(value) => parse_date(value)?,
            None => default.start,
        };
        let end = match &self.end {
            Some(value) => parse_date(value)?,
            None => default.end,
        };
        DateRange::select(start, end)
    }
}

#[derive(Debug, Serialize)]
pub struct PanelsResponse {
    pub range: DateRange,
    pub panels: Vec<PanelUpdate>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: u64,
    pub settled: bool,
    pub snapshot: BoardSnapshot,
}

impl SessionResponse {
    fn new(id: u64, snapshot: BoardSnapshot) -> Self {
        Self {
            id,
            settled: snapshot.is_settled(),
            snapshot,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Static page layout with the default range filled in
pub async fn get_layout(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let layout = state.dashboard_service.layout();
    match json_response(&layout, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Render all bound panels for one range
pub async fn get_panels(
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let range = query.resolve(DateRange::default_today())?;
    let panels = state.dashboard_service.render_all(range).await;

    json_response(&PanelsResponse { range, panels }, accepts_brotli(&headers))
        .await
        .map_err(ApiError::Response)
}

/// Open a page session on the default range
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let (id, session) = state.dashboard_service.open_session().await?;
    let snapshot = session.snapshot().await;

    Ok((StatusCode::CREATED, Json(SessionResponse::new(id, snapshot))))
}

/// Publish a new range to a session's panels
pub async fn select_range(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RangeQuery>,
) -> Result<Json<Selection>, ApiError> {
    let session = state
        .dashboard_service
        .session(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    let range = body.resolve(session.current().range)?;
    Ok(Json(session.select(range).await))
}

pub async fn get_session(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .dashboard_service
        .session(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    Ok(Json(SessionResponse::new(id, session.snapshot().await)))
}

/// Stream panel updates for a session (progressive loading)
pub async fn session_events(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .dashboard_service
        .session(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    Ok(stream_from_receiver(session.subscribe()))
}

pub async fn close_session(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    if state.dashboard_service.close_session(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}
