//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::transit::RouteError;

use super::dto::*;
use super::state::AppState;

type NotFound = (StatusCode, Json<ErrorResponse>);

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops/:name", get(get_stop))
        .route("/buses/:name", get(get_bus))
        .route("/route", get(get_route))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Summary of one stop: which buses serve it.
async fn get_stop(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StopResponse>, NotFound> {
    match state.register.stop(&name) {
        Some(summary) => Ok(Json(StopResponse::from(summary))),
        None => Err(not_found(format!("unknown stop {name}"))),
    }
}

/// Summary of one bus line.
async fn get_bus(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BusResponse>, NotFound> {
    match state.register.bus(&name) {
        Some(summary) => Ok(Json(BusResponse::from(summary))),
        None => Err(not_found(format!("unknown bus {name}"))),
    }
}

/// Fastest itinerary between two stops.
///
/// Unknown stops and unreachable pairs both come back as 404, with
/// messages that tell the two cases apart.
async fn get_route(
    State(state): State<AppState>,
    Query(request): Query<RouteRequest>,
) -> Result<Json<RouteResponse>, NotFound> {
    match state.register.find_route(&request.from, &request.to) {
        Ok(itinerary) => Ok(Json(RouteResponse::from(&itinerary))),
        Err(err @ (RouteError::UnknownStop(_) | RouteError::NoRoute { .. })) => {
            Err(not_found(err.to_string()))
        }
    }
}

fn not_found(message: String) -> NotFound {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: message }),
    )
}
