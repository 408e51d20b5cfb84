//! Money movement: funding-source registration and transfers between linked banks.

use std::str::FromStr;

use base64::Engine;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{idempotency, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{NewTransferRecord, TransferRecord, User};
use crate::services::dwolla::{DwollaClient, FundingSourceRequest, TransferRequest};
use crate::services::identity::IdentityClient;

/// Register a bank (via its processor token) as a funding source of a customer.
///
/// The authorization grant is requested first; if that fails no funding
/// source is created.
pub async fn add_funding_source(
    dwolla: &DwollaClient,
    customer_id: &str,
    processor_token: &str,
    bank_name: &str,
) -> AppResult<String> {
    let authorization = dwolla.create_on_demand_authorization().await?;

    let request = FundingSourceRequest {
        name: bank_name.to_string(),
        plaid_token: processor_token.to_string(),
        links: authorization.funding_source_links()?,
    };
    let url = dwolla.create_funding_source(customer_id, &request).await?;
    tracing::info!("Added funding source for customer {customer_id}: {url}");
    Ok(url)
}

/// Send `amount` between two funding sources and return the transfer URL.
pub async fn create_transfer(
    dwolla: &DwollaClient,
    source_funding_source_url: &str,
    destination_funding_source_url: &str,
    amount: Decimal,
    idempotency_key: Option<&str>,
) -> AppResult<String> {
    let request = TransferRequest::new(
        source_funding_source_url,
        destination_funding_source_url,
        amount,
    );
    dwolla.create_transfer(&request, idempotency_key).await
}

/// Parse a user-entered amount: positive, at most two fractional digits.
pub fn parse_amount(raw: &str) -> AppResult<Decimal> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid amount: {raw}")))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("Amount must be positive".into()));
    }
    if amount.normalize().scale() > 2 {
        return Err(AppError::BadRequest(
            "Amount must have at most two decimal places".into(),
        ));
    }
    Ok(amount)
}

/// Public handle for a linked account that other users can send money to.
pub fn encode_shareable_id(account_id: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(account_id)
}

pub fn decode_shareable_id(shareable_id: &str) -> AppResult<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(shareable_id.trim())
        .map_err(|_| AppError::BadRequest("Invalid shareable id".into()))?;
    String::from_utf8(bytes).map_err(|_| AppError::BadRequest("Invalid shareable id".into()))
}

#[derive(Debug, Clone)]
pub struct PaymentTransfer {
    pub name: String,
    pub email: String,
    pub source_bank_id: String,
    pub shareable_id: String,
    pub amount: String,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub location: String,
    pub replayed: bool,
    pub record: Option<TransferRecord>,
}

/// Move money from one of `sender`'s banks to the bank behind a shareable id.
pub async fn send_payment(
    identity: &IdentityClient,
    dwolla: &DwollaClient,
    db: &DbPool,
    sender: &User,
    payment: PaymentTransfer,
) -> AppResult<TransferOutcome> {
    let amount = parse_amount(&payment.amount)?;
    let receiver_account_id = decode_shareable_id(&payment.shareable_id)?;

    let receiver_bank = identity.get_bank_by_account_id(&receiver_account_id).await?;
    let sender_bank = identity.get_bank(&payment.source_bank_id).await?;
    if sender_bank.user_id != sender.id {
        return Err(AppError::NotFound("Bank not found".into()));
    }

    let mut amount_value = amount;
    amount_value.rescale(2);
    let amount_str = amount_value.to_string();

    if let Some(ref key) = payment.idempotency_key {
        let fp = idempotency::fingerprint(&[
            &sender_bank.funding_source_url,
            &receiver_bank.funding_source_url,
            &amount_str,
        ]);
        if let idempotency::Claim::Replay(location) =
            idempotency::claim(db, &sender.id, key, &fp)?
        {
            tracing::info!("Replaying transfer for idempotency key {key}: {location}");
            return Ok(TransferOutcome {
                location,
                replayed: true,
                record: None,
            });
        }
    }

    let upstream_key = payment
        .idempotency_key
        .as_deref()
        .map(|key| idempotency::upstream_key(&sender.id, key));
    let transfer = create_transfer(
        dwolla,
        &sender_bank.funding_source_url,
        &receiver_bank.funding_source_url,
        amount,
        upstream_key.as_deref(),
    )
    .await;

    let location = match transfer {
        Ok(location) => location,
        Err(e) => {
            if let Some(ref key) = payment.idempotency_key {
                idempotency::release(db, &sender.id, key)?;
            }
            return Err(e);
        }
    };

    // The money already moved; a stuck key is reclaimed once it goes stale.
    if let Some(ref key) = payment.idempotency_key {
        if let Err(e) = idempotency::complete(db, &sender.id, key, &location) {
            tracing::error!("Transfer {location} succeeded but completing key {key} failed: {e}");
        }
    }
    tracing::info!("Transfer created: {location}");

    let record = NewTransferRecord {
        name: payment.name,
        amount: amount_str,
        channel: "online".to_string(),
        category: "Transfer".to_string(),
        sender_id: sender_bank.user_id.clone(),
        sender_bank_id: sender_bank.id.clone(),
        receiver_id: receiver_bank.user_id.clone(),
        receiver_bank_id: receiver_bank.id.clone(),
        email: payment.email,
    };

    let record = match identity.create_transfer_record(&record).await {
        Ok(r) => Some(r),
        Err(e) => {
            tracing::error!("Transfer {location} succeeded but recording it failed: {e}");
            None
        }
    };

    Ok(TransferOutcome {
        location,
        replayed: false,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive_with_cents_precision() {
        assert_eq!(parse_amount("10").unwrap(), Decimal::from(10));
        assert_eq!(parse_amount(" 12.50 ").unwrap().to_string(), "12.50");
        assert_eq!(parse_amount("1.500").unwrap().to_string(), "1.500");
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.005").is_err());
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn shareable_id_decodes_back_to_account_id() {
        let id = encode_shareable_id("vzeNDwK7KQIm4yEog683uElbp9GRLEFXGK98D");
        assert_eq!(decode_shareable_id(&id).unwrap(), "vzeNDwK7KQIm4yEog683uElbp9GRLEFXGK98D");
        assert!(decode_shareable_id("not base64!").is_err());
    }
}
