use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::AppState;
use crate::services::transfers::{send_payment, PaymentTransfer, TransferOutcome};

const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    /// Note shown in both parties' transaction history.
    pub name: String,
    pub email: String,
    pub sender_bank_id: String,
    pub shareable_id: String,
    pub amount: String,
}

fn idempotency_key(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(IDEMPOTENCY_HEADER) else {
        return Ok(None);
    };
    let key = value
        .to_str()
        .map_err(|_| AppError::BadRequest("Idempotency-Key must be ASCII".into()))?
        .trim();
    if key.is_empty() || key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::BadRequest(format!(
            "Idempotency-Key must be 1 to {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(Some(key.to_string()))
}

/// POST /api/v1/transfers
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(body): Json<CreateTransferRequest>,
) -> AppResult<(StatusCode, Json<TransferOutcome>)> {
    if body.email.is_empty() || !body.email.contains('@') {
        return Err(AppError::BadRequest("Invalid receiver email".into()));
    }
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Transfer note is required".into()));
    }

    let payment = PaymentTransfer {
        name: body.name,
        email: body.email,
        source_bank_id: body.sender_bank_id,
        shareable_id: body.shareable_id,
        amount: body.amount,
        idempotency_key: idempotency_key(&headers)?,
    };

    let outcome = send_payment(&state.identity, &state.dwolla, &state.db, &user, payment).await?;
    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}
