//! Typed client for the checkbook payments API.
//!
//! Each resource of the API gets a small handle borrowing the client
//! (`client.checks().list(..)`). The handles only map requests and
//! responses; the platform owns every business rule.

mod approval;
mod bank;
mod card;
mod check;
mod directory;
mod invoice;
mod subscription;
mod user;

pub use approval::{Approval, ApprovalList, Approvals, UpdateApproval};
pub use bank::{
    BankAccount, BankAccounts, MicroDeposits, NewBankAccount, ProcessorTokenBank,
    UpdateBankAccount,
};
pub use card::{Card, Cards, NewCard};
pub use check::{Check, CheckList, Checks, DigitalCheck, MailingAddress, PhysicalCheck};
pub use directory::{Contact, Directory, NewContact};
pub use invoice::{Invoice, InvoiceList, Invoices, NewInvoice, PayInvoice};
pub use subscription::{
    NewSubscription, Subscription, SubscriptionList, Subscriptions, UpdateSubscription,
};
pub use user::{ApiKey, UpdateUser, UserDetails, Users};

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::CheckbookConfig;
use crate::error::{check_status, AppError, AppResult};

const SERVICE: &str = "checkbook";

/// Filters shared by the list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Paging envelope returned next to every list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Clone)]
pub struct CheckbookClient {
    http: Client,
    config: CheckbookConfig,
}

impl CheckbookClient {
    pub fn new(http: Client, config: CheckbookConfig) -> Self {
        Self { http, config }
    }

    fn authorization(&self) -> AppResult<String> {
        match (&self.config.api_key, &self.config.api_secret) {
            (Some(key), Some(secret)) => Ok(format!("{key}:{secret}")),
            _ => Err(AppError::Internal(
                "CHECKBOOK_API_KEY / CHECKBOOK_API_SECRET are not set".into(),
            )),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&ListQuery>,
        body: Option<&serde_json::Value>,
    ) -> AppResult<reqwest::Response> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let mut req = self
            .http
            .request(method, url)
            .header("Authorization", self.authorization()?)
            .header("Accept", "application/json");
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        check_status(SERVICE, req.send().await?).await
    }

    pub(crate) async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&ListQuery>,
    ) -> AppResult<R> {
        Ok(self.send(Method::GET, path, query, None).await?.json().await?)
    }

    pub(crate) async fn post<T, R>(&self, path: &str, body: &T) -> AppResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_json(body)?;
        Ok(self
            .send(Method::POST, path, None, Some(&body))
            .await?
            .json()
            .await?)
    }

    pub(crate) async fn post_empty<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> AppResult<()> {
        let body = to_json(body)?;
        self.send(Method::POST, path, None, Some(&body)).await?;
        Ok(())
    }

    pub(crate) async fn put<T, R>(&self, path: &str, body: &T) -> AppResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_json(body)?;
        Ok(self
            .send(Method::PUT, path, None, Some(&body))
            .await?
            .json()
            .await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> AppResult<()> {
        self.send(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    pub fn bank_accounts(&self) -> BankAccounts<'_> {
        BankAccounts::new(self)
    }

    pub fn cards(&self) -> Cards<'_> {
        Cards::new(self)
    }

    pub fn checks(&self) -> Checks<'_> {
        Checks::new(self)
    }

    pub fn approvals(&self) -> Approvals<'_> {
        Approvals::new(self)
    }

    pub fn invoices(&self) -> Invoices<'_> {
        Invoices::new(self)
    }

    pub fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions::new(self)
    }

    pub fn directory(&self) -> Directory<'_> {
        Directory::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }
}

fn to_json<T: Serialize + ?Sized>(body: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| AppError::Internal(format!("encode request: {e}")))
}
