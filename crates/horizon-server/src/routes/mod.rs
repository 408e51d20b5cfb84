mod auth;
mod banks;
mod dashboard;
mod transfers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};

use crate::auth::middleware::require_auth;
use crate::config::Config;
use crate::db::DbPool;
use crate::services::checkbook::CheckbookClient;
use crate::services::dwolla::DwollaClient;
use crate::services::identity::IdentityClient;
use crate::services::plaid::PlaidClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub identity: IdentityClient,
    pub plaid: PlaidClient,
    pub dwolla: DwollaClient,
    pub checkbook: CheckbookClient,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("horizon/0.1")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            identity: IdentityClient::new(http.clone(), config.appwrite.clone()),
            plaid: PlaidClient::new(http.clone(), config.plaid.clone()),
            dwolla: DwollaClient::new(http.clone(), config.dwolla.clone()),
            checkbook: CheckbookClient::new(http, config.checkbook.clone()),
            db,
            config,
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    // Auth routes: burst of 10 per client IP
    let auth_governor = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(6)
        .burst_size(10)
        .finish()
        .unwrap();

    // Protected API: burst of 120 per client IP
    let api_governor = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(2)
        .burst_size(120)
        .finish()
        .unwrap();

    // Health checks are not rate limited
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health));

    let auth_routes = Router::new()
        .route("/api/v1/auth/sign-up", post(auth::sign_up))
        .route("/api/v1/auth/sign-in", post(auth::sign_in))
        .route("/api/v1/auth/logout", post(auth::logout))
        .layer(GovernorLayer::new(Arc::new(auth_governor)));

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        // Bank linking
        .route("/api/v1/banks/link-token", post(banks::link_token))
        .route("/api/v1/banks/exchange", post(banks::exchange))
        .route("/api/v1/banks", get(banks::list))
        .route("/api/v1/accounts/{bank_id}", get(banks::account))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        // Money movement
        .route("/api/v1/transfers", post(transfers::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .layer(GovernorLayer::new(Arc::new(api_governor)));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(protected)
        .with_state(state)
}
