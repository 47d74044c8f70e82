//! Per-user account documents: marketing profiles and debits.

use axum::{
    extract::{Path, State},
    Json,
};
use bridge_core::{Debit, MarketingProfile};

use crate::{
    error::GatewayError,
    routes::{parse_user, AppState, Route, RouteTable},
};

/// Marketing profile routes.
pub struct MarketingRouter;

impl RouteTable for MarketingRouter {
    fn definitions(&self) -> Vec<Route> {
        vec![Route::get("/marketing/{user}", get_marketing)]
    }
}

/// Debit routes.
pub struct DebitsRouter;

impl RouteTable for DebitsRouter {
    fn definitions(&self) -> Vec<Route> {
        vec![Route::get("/debits/{user}", list_debits)]
    }
}

/// `GET /marketing/{user}` — the user's profile, created on first access.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] for a malformed user, or
/// [`GatewayError::Store`] if the store fails.
pub async fn get_marketing(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<MarketingProfile>, GatewayError> {
    let user = parse_user(&user)?;
    Ok(Json(state.store.get_or_create_marketing(&user).await?))
}

/// `GET /debits/{user}` — all debits charged to the user.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] for a malformed user, or
/// [`GatewayError::Store`] if the store fails.
pub async fn list_debits(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<Debit>>, GatewayError> {
    let user = parse_user(&user)?;
    Ok(Json(state.store.debits_for(&user).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use bridge_core::DebitKind;
    use bridge_referrals::DocumentStore;

    use crate::routes::test_support::{get, json, log_state, send};

    #[tokio::test]
    async fn marketing_profile_is_created_once() {
        let (_, state) = log_state();
        let (status, first) = send(state.clone(), get("/marketing/dylan@storj.io")).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = send(state, get("/marketing/dylan@storj.io")).await;
        let (first, second) = (json(&first), json(&second));
        assert_eq!(first["id"], second["id"], "profile must not be recreated");
        assert_eq!(first["user"], "dylan@storj.io");
        assert!(first["referralLink"].is_string());
    }

    #[tokio::test]
    async fn debits_are_listed_for_user() {
        let (store, state) = log_state();
        let debit = bridge_core::Debit::new("dylan@storj.io", 0.75, DebitKind::Bandwidth);
        assert!(store.insert_debit(debit).await.is_ok());
        let (status, body) = send(state, get("/debits/dylan@storj.io")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["type"], "bandwidth");
    }

    #[tokio::test]
    async fn malformed_user_is_bad_request() {
        let (_, state) = log_state();
        let (status, body) = send(state, get("/debits/not-a-user")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn store_outage_is_503() {
        let (store, state) = log_state();
        store.set_ready(false);
        let (status, _) = send(state, get("/marketing/dylan@storj.io")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
