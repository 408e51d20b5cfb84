use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CheckbookClient, ListQuery, PageInfo};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub number: Option<u64>,
    pub name: String,
    pub recipient: serde_json::Value,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalCheck {
    /// Recipient email address.
    pub recipient: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sending bank account; the default account when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailingAddress {
    pub line_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalCheck {
    pub recipient: MailingAddress,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckList {
    pub checks: Vec<Check>,
    #[serde(flatten)]
    pub page: PageInfo,
}

pub struct Checks<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Checks<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<CheckList> {
        self.client.get("/check", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Check> {
        self.client.get(&format!("/check/{id}"), None).await
    }

    pub async fn void(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/check/{id}")).await
    }

    pub async fn send_digital(&self, check: &DigitalCheck) -> AppResult<Check> {
        self.client.post("/check/digital", check).await
    }

    pub async fn send_physical(&self, check: &PhysicalCheck) -> AppResult<Check> {
        self.client.post("/check/physical", check).await
    }
}
