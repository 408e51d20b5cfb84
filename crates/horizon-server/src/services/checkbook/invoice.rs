use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CheckbookClient, ListQuery, PageInfo};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub name: String,
    pub recipient: String,
    pub status: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    /// Email of the party being billed.
    pub recipient: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayInvoice {
    pub id: String,
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceList {
    pub invoices: Vec<Invoice>,
    #[serde(flatten)]
    pub page: PageInfo,
}

pub struct Invoices<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Invoices<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<InvoiceList> {
        self.client.get("/invoice", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Invoice> {
        self.client.get(&format!("/invoice/{id}"), None).await
    }

    pub async fn create(&self, invoice: &NewInvoice) -> AppResult<Invoice> {
        self.client.post("/invoice", invoice).await
    }

    pub async fn pay(&self, payment: &PayInvoice) -> AppResult<()> {
        self.client.post_empty("/invoice/payment", payment).await
    }

    pub async fn cancel(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/invoice/{id}")).await
    }
}
