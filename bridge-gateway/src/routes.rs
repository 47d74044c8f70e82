//! Route tables and router assembly for the bridge gateway.
//!
//! Each handler group implements [`RouteTable`] and lists its
//! `(method, path, handler)` entries; [`create_router`] registers every
//! table on one axum router.

use std::sync::Arc;

use axum::{
    handler::Handler,
    http::Method,
    routing::{self, MethodRouter},
    Router,
};
use bridge_core::Email;
use bridge_referrals::{
    BatchOrchestrator, DocumentStore, MailTransport, MailerDispatcher, ReferralConfig,
    StoreEligibility, StoreReferralCreator,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    accounts::{DebitsRouter, MarketingRouter},
    error::GatewayError,
    health::HealthRouter,
    referrals::ReferralsRouter,
};

// ── Shared state ─────────────────────────────────────────────────────────────

/// Orchestrator wired to the store-backed collaborators.
pub type Referrals = BatchOrchestrator<
    StoreEligibility<dyn DocumentStore>,
    StoreReferralCreator<dyn DocumentStore>,
    MailerDispatcher<Box<dyn MailTransport>>,
>;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub referrals: Arc<Referrals>,
}

impl AppState {
    /// Assemble the referral pipeline over `store` and `transport`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if the configured credit amount is
    /// invalid.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        transport: Box<dyn MailTransport>,
        config: &ReferralConfig,
    ) -> Result<Self, GatewayError> {
        let credit = config
            .credit()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        let referrals = BatchOrchestrator::new(
            StoreEligibility::new(Arc::clone(&store)),
            StoreReferralCreator::new(Arc::clone(&store), credit, config.channel),
            MailerDispatcher::new(
                transport,
                config.mail_template.clone(),
                config.referral_url_base.clone(),
            ),
            config,
        );
        Ok(Self {
            store,
            referrals: Arc::new(referrals),
        })
    }
}

// ── Route tables ─────────────────────────────────────────────────────────────

/// One entry of a route table.
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub handler: MethodRouter<AppState>,
}

impl Route {
    /// A `GET` route.
    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method: Method::GET,
            path,
            handler: routing::get(handler),
        }
    }

    /// A `POST` route.
    pub fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method: Method::POST,
            path,
            handler: routing::post(handler),
        }
    }
}

/// A group of handlers that registers itself by listing its routes.
pub trait RouteTable {
    /// The `(method, path, handler)` entries served by this group.
    fn definitions(&self) -> Vec<Route>;
}

/// Register every route of every table on `router`.
pub fn register(router: Router<AppState>, tables: &[&dyn RouteTable]) -> Router<AppState> {
    tables
        .iter()
        .flat_map(|table| table.definitions())
        .fold(router, |router, route| {
            tracing::debug!(method = %route.method, path = route.path, "route registered");
            router.route(route.path, route.handler)
        })
}

/// Every route table served by the gateway.
fn route_tables() -> [&'static dyn RouteTable; 4] {
    [&HealthRouter, &ReferralsRouter, &MarketingRouter, &DebitsRouter]
}

/// Build the application router over the given state.
pub fn create_router(state: AppState) -> Router {
    register(Router::new(), &route_tables())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Parse a user identity taken from a request path.
pub(crate) fn parse_user(raw: &str) -> Result<Email, GatewayError> {
    Email::parse(raw).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}
