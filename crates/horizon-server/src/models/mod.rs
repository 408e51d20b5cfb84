use serde::{Deserialize, Serialize};

/// Account record held by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Email/password session issued by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Only returned to server-side callers holding an API key.
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub expire: Option<String>,
}

/// Profile document stored next to the provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    pub dwolla_customer_id: String,
    pub dwolla_customer_url: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    pub dwolla_customer_id: String,
    pub dwolla_customer_url: String,
}

/// A linked bank account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    pub bank_id: String,
    pub account_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub funding_source_url: String,
    pub shareable_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBank {
    pub user_id: String,
    pub bank_id: String,
    pub account_id: String,
    pub access_token: String,
    pub funding_source_url: String,
    pub shareable_id: String,
}

/// Transfer recorded after the payment network accepted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub amount: String,
    pub channel: String,
    pub category: String,
    pub sender_id: String,
    pub sender_bank_id: String,
    pub receiver_id: String,
    pub receiver_bank_id: String,
    pub email: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransferRecord {
    pub name: String,
    pub amount: String,
    pub channel: String,
    pub category: String,
    pub sender_id: String,
    pub sender_bank_id: String,
    pub receiver_id: String,
    pub receiver_bank_id: String,
    pub email: String,
}
