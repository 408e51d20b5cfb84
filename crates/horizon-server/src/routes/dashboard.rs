use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::User;
use crate::routes::AppState;
use crate::services::dashboard::{build_dashboard, Dashboard};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub bank_id: Option<String>,
    pub page: Option<usize>,
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<Dashboard>> {
    let dashboard = build_dashboard(
        &state.identity,
        &state.plaid,
        user,
        query.bank_id.as_deref(),
        query.page.unwrap_or(1),
    )
    .await?;
    Ok(Json(dashboard))
}
