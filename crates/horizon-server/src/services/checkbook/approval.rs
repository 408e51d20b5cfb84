use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CheckbookClient, ListQuery, PageInfo};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub name: String,
    pub recipient: serde_json::Value,
    pub status: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateApproval {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalList {
    pub approvals: Vec<Approval>,
    #[serde(flatten)]
    pub page: PageInfo,
}

pub struct Approvals<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Approvals<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<ApprovalList> {
        self.client.get("/approval", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Approval> {
        self.client.get(&format!("/approval/{id}"), None).await
    }

    pub async fn update(&self, id: &str, update: &UpdateApproval) -> AppResult<Approval> {
        self.client.put(&format!("/approval/{id}"), update).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/approval/{id}")).await
    }

    /// Release an approved payment to its recipient.
    pub async fn release(&self, id: &str) -> AppResult<Approval> {
        self.client
            .post(&format!("/approval/{id}/release"), &serde_json::json!({}))
            .await
    }
}
