//! `GET /health` — readiness of the document store.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::routes::{AppState, Route, RouteTable};

/// Health check routes.
pub struct HealthRouter;

impl RouteTable for HealthRouter {
    fn definitions(&self) -> Vec<Route> {
        vec![Route::get("/health", health_check)]
    }
}

/// `GET /health` — `200 OK` while the store connection is ready, `502`
/// otherwise.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.store.is_ready() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::BAD_GATEWAY, "Service Unavailable")
    }
}
