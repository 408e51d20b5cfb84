use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CheckbookClient, ListQuery, PageInfo};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub name: String,
    pub recipient: serde_json::Value,
    /// `WEEKLY` or `MONTHLY`.
    pub interval: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub recipient: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubscription {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionList {
    pub subscriptions: Vec<Subscription>,
    #[serde(flatten)]
    pub page: PageInfo,
}

pub struct Subscriptions<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Subscriptions<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<SubscriptionList> {
        self.client.get("/subscription", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Subscription> {
        self.client.get(&format!("/subscription/{id}"), None).await
    }

    pub async fn update(&self, id: &str, update: &UpdateSubscription) -> AppResult<Subscription> {
        self.client.put(&format!("/subscription/{id}"), update).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/subscription/{id}")).await
    }

    /// Recurring digital check.
    pub async fn create_check(&self, subscription: &NewSubscription) -> AppResult<Subscription> {
        self.client.post("/subscription/check", subscription).await
    }

    /// Recurring invoice.
    pub async fn create_invoice(&self, subscription: &NewSubscription) -> AppResult<Subscription> {
        self.client.post("/subscription/invoice", subscription).await
    }
}
