//! Referral endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use bridge_core::{MarketingProfile, Referral};
use bridge_referrals::{BatchResult, SenderContext};
use serde::Deserialize;

use crate::{
    error::GatewayError,
    routes::{parse_user, AppState, Route, RouteTable},
};

/// Referral routes.
pub struct ReferralsRouter;

impl RouteTable for ReferralsRouter {
    fn definitions(&self) -> Vec<Route> {
        vec![
            Route::post("/referrals/sendReferralEmail", send_referral_email),
            Route::get("/referrals/{user}", list_referrals),
        ]
    }
}

/// Body of `POST /referrals/sendReferralEmail`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReferralBody {
    pub marketing: MarketingProfile,
    #[serde(default)]
    pub email_list: Vec<String>,
}

/// `POST /referrals/sendReferralEmail` — refer every address in
/// `emailList` and report per-recipient outcomes.
///
/// Well-formed batches always answer `200`, even when every recipient
/// failed.
///
/// # Errors
/// Returns [`GatewayError::Referral`] (`400`) for an empty list, a missing
/// sender, or a recipient listed twice.
pub async fn send_referral_email(
    State(state): State<AppState>,
    Json(body): Json<SendReferralBody>,
) -> Result<Json<BatchResult>, GatewayError> {
    let sender = SenderContext::new(body.marketing)?;
    let result = state
        .referrals
        .send_referral_batch(&sender, body.email_list)
        .await?;
    Ok(Json(result))
}

/// `GET /referrals/{user}` — referrals sent by the user.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] for a malformed user, or
/// [`GatewayError::Store`] if the store fails.
pub async fn list_referrals(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<Referral>>, GatewayError> {
    let user = parse_user(&user)?;
    Ok(Json(state.store.referrals_sent_by(&user).await?))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use bridge_core::Email;
    use bridge_referrals::{MailTransport, TransportError};
    use serde_json::{json, Value};

    use super::*;
    use crate::routes::test_support::{
        get, json as parse, log_state, memory_state, post_json, send,
    };

    struct RejectingTransport;

    #[async_trait]
    impl MailTransport for RejectingTransport {
        async fn dispatch(
            &self,
            _template: &str,
            _recipient: &Email,
            _context: &Value,
        ) -> Result<(), TransportError> {
            Err(TransportError::Rejected("Internal mailer error".to_owned()))
        }
    }

    fn body(list: &[&str]) -> Value {
        json!({
            "marketing": { "user": "dylan@storj.io", "referralLink": "abc-123" },
            "emailList": list,
        })
    }

    #[tokio::test]
    async fn send_referral_email_reports_mixed_outcomes_with_200() {
        let (_, state) = log_state();
        let list = ["a@storj.io", "dylan@storj.io", "bogus"];
        let req = post_json("/referrals/sendReferralEmail", &body(&list));
        let (status, bytes) = send(state, req).await;
        assert_eq!(status, StatusCode::OK);

        let result: BatchResult = match serde_json::from_slice(&bytes) {
            Ok(r) => r,
            Err(e) => panic!("unexpected body: {e}"),
        };
        assert_eq!(result.successes, vec!["a@storj.io".to_owned()]);
        assert_eq!(result.failures.len(), 2);
        assert!(
            result.failure_for("dylan@storj.io").is_some(),
            "sender cannot refer themselves"
        );
        assert!(matches!(result.failure_for("bogus"), Some(f) if f.code == 400));
    }

    #[tokio::test]
    async fn send_referral_email_records_referrals() {
        let (_, state) = log_state();
        let req = post_json(
            "/referrals/sendReferralEmail",
            &body(&["a@storj.io", "b@storj.io"]),
        );
        let (status, _) = send(state.clone(), req).await;
        assert_eq!(status, StatusCode::OK);

        let (status, bytes) = send(state, get("/referrals/dylan@storj.io")).await;
        assert_eq!(status, StatusCode::OK);
        let listed = parse(&bytes);
        assert_eq!(listed.as_array().map(Vec::len), Some(2));
        assert_eq!(listed[0]["sender"]["referralLink"], "abc-123");
        assert_eq!(listed[0]["type"], "email");
    }

    #[tokio::test]
    async fn mailer_failure_is_reported_per_recipient() {
        let (_, state) = memory_state(Box::new(RejectingTransport));
        let req = post_json("/referrals/sendReferralEmail", &body(&["a@storj.io"]));
        let (status, bytes) = send(state, req).await;
        assert_eq!(
            status,
            StatusCode::OK,
            "recipient failures never fail the request"
        );
        let result = parse(&bytes);
        assert_eq!(result["successes"], json!([]));
        assert_eq!(
            result["failures"],
            json!([{ "email": "a@storj.io", "message": "Internal mailer error", "code": 500 }])
        );
    }

    #[tokio::test]
    async fn empty_email_list_is_bad_request() {
        let (_, state) = log_state();
        let req = post_json("/referrals/sendReferralEmail", &body(&[]));
        let (status, bytes) = send(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&bytes)["error"], "recipient list is empty");
    }

    #[tokio::test]
    async fn missing_email_list_is_bad_request() {
        let (_, state) = log_state();
        let payload = json!({ "marketing": { "user": "dylan@storj.io" } });
        let req = post_json("/referrals/sendReferralEmail", &payload);
        let (status, _) = send(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unauthenticated_sender_is_bad_request() {
        let (_, state) = log_state();
        let req = post_json(
            "/referrals/sendReferralEmail",
            &json!({ "marketing": { "user": "" }, "emailList": ["a@storj.io"] }),
        );
        let (status, bytes) = send(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&bytes)["error"], "sender is not authenticated");
    }

    #[tokio::test]
    async fn duplicate_recipients_are_bad_request() {
        let (_, state) = log_state();
        let req = post_json(
            "/referrals/sendReferralEmail",
            &body(&["a@storj.io", "A@storj.io"]),
        );
        let (status, _) = send(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (_, state) = log_state();
        let req = match axum::http::Request::builder()
            .method("POST")
            .uri("/referrals/sendReferralEmail")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let (status, _) = send(state, req).await;
        assert!(
            status.is_client_error(),
            "malformed bodies must be 4xx, got {status}"
        );
    }
}
