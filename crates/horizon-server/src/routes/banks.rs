use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Bank, NewBank, User};
use crate::routes::AppState;
use crate::services::dashboard::{self, AccountDetail, AccountsOverview};
use crate::services::transfers::{add_funding_source, encode_shareable_id};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTokenResponse {
    pub link_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub public_token: String,
}

/// POST /api/v1/banks/link-token
pub async fn link_token(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<LinkTokenResponse>> {
    let link_token = state.plaid.create_link_token(&user).await?;
    Ok(Json(LinkTokenResponse { link_token }))
}

/// POST /api/v1/banks/exchange
///
/// Turns the public token from the link widget into a linked bank with a
/// funding source at the payment network.
pub async fn exchange(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<ExchangeRequest>,
) -> AppResult<(StatusCode, Json<Bank>)> {
    if body.public_token.is_empty() {
        return Err(AppError::BadRequest("Public token is required".into()));
    }

    let exchange = state.plaid.exchange_public_token(&body.public_token).await?;
    let accounts = state.plaid.get_accounts(&exchange.access_token).await?;
    let account = accounts
        .accounts
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("No accounts were linked".into()))?;

    let processor_token = state
        .plaid
        .create_processor_token(&exchange.access_token, &account.account_id)
        .await?;

    let funding_source_url = add_funding_source(
        &state.dwolla,
        &user.dwolla_customer_id,
        &processor_token,
        &account.name,
    )
    .await?;

    let bank = state
        .identity
        .create_bank(&NewBank {
            user_id: user.id.clone(),
            bank_id: exchange.item_id,
            shareable_id: encode_shareable_id(&account.account_id),
            account_id: account.account_id,
            access_token: exchange.access_token,
            funding_source_url,
        })
        .await?;

    tracing::info!("Linked bank {} for user {}", bank.id, user.id);
    Ok((StatusCode::CREATED, Json(bank)))
}

/// GET /api/v1/banks
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<AccountsOverview>> {
    let overview = dashboard::get_accounts(&state.identity, &state.plaid, &user).await?;
    Ok(Json(overview))
}

/// GET /api/v1/accounts/{bank_id}
pub async fn account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(bank_id): Path<String>,
) -> AppResult<Json<AccountDetail>> {
    let bank = state.identity.get_bank(&bank_id).await?;
    if bank.user_id != user.id {
        return Err(AppError::NotFound("Bank not found".into()));
    }
    let detail = dashboard::get_account(&state.identity, &state.plaid, &bank).await?;
    Ok(Json(detail))
}
