use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CheckbookClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: String,
    /// Masked account number.
    pub account: String,
    pub routing: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub status: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBankAccount {
    pub account: String,
    pub routing: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBankAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

/// Instant verification through a bank-aggregator processor token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorTokenBank {
    pub processor_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroDeposits {
    pub account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_1: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_2: Decimal,
}

#[derive(Debug, Deserialize)]
struct BankList {
    banks: Vec<BankAccount>,
}

pub struct BankAccounts<'a> {
    client: &'a CheckbookClient,
}

impl<'a> BankAccounts<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> AppResult<Vec<BankAccount>> {
        let list: BankList = self.client.get("/account/bank", None).await?;
        Ok(list.banks)
    }

    pub async fn add(&self, bank: &NewBankAccount) -> AppResult<BankAccount> {
        self.client.post("/account/bank", bank).await
    }

    pub async fn update(&self, id: &str, update: &UpdateBankAccount) -> AppResult<BankAccount> {
        self.client.put(&format!("/account/bank/{id}"), update).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/account/bank/{id}")).await
    }

    pub async fn instant_verify(&self, request: &ProcessorTokenBank) -> AppResult<Vec<BankAccount>> {
        let created: BankList = self
            .client
            .post("/account/bank/iav/plaid", request)
            .await?;
        Ok(created.banks)
    }

    /// Release the micro-deposits for an unverified account.
    pub async fn release(&self, account_id: &str) -> AppResult<()> {
        self.client
            .post_empty("/account/bank/release", &serde_json::json!({ "account": account_id }))
            .await
    }

    pub async fn verify(&self, deposits: &MicroDeposits) -> AppResult<()> {
        self.client.post_empty("/account/bank/verify", deposits).await
    }
}
