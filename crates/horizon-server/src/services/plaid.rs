//! Bank aggregator client (link tokens, token exchange, accounts, processor
//! tokens, institutions, transactions).

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PlaidConfig;
use crate::error::{check_status, AppError, AppResult};
use crate::models::User;

const SERVICE: &str = "plaid";

/// Processor the aggregator mints processor tokens for.
pub const PAYMENT_PROCESSOR: &str = "dwolla";

/// Upper bound on `/transactions/sync` pages pulled per request.
pub const MAX_SYNC_PAGES: usize = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchange {
    pub access_token: String,
    pub item_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balances {
    pub available: Option<f64>,
    pub current: Option<f64>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaidAccount {
    pub account_id: String,
    pub balances: Balances,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub item_id: String,
    #[serde(default)]
    pub institution_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<PlaidAccount>,
    pub item: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub institution_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceCategory {
    pub primary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaidTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub payment_channel: Option<String>,
    #[serde(default)]
    pub personal_finance_category: Option<FinanceCategory>,
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl PlaidTransaction {
    pub fn category_name(&self) -> String {
        self.personal_finance_category
            .as_ref()
            .map(|c| c.primary.clone())
            .or_else(|| self.category.as_ref().and_then(|c| c.first().cloned()))
            .unwrap_or_else(|| "Other".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct LinkTokenResponse {
    link_token: String,
}

#[derive(Debug, Deserialize)]
struct ProcessorTokenResponse {
    processor_token: String,
}

#[derive(Debug, Deserialize)]
struct InstitutionResponse {
    institution: Institution,
}

#[derive(Debug, Deserialize)]
struct TransactionsSyncResponse {
    added: Vec<PlaidTransaction>,
    has_more: bool,
    next_cursor: String,
}

#[derive(Clone)]
pub struct PlaidClient {
    http: Client,
    config: PlaidConfig,
}

impl PlaidClient {
    pub fn new(http: Client, config: PlaidConfig) -> Self {
        Self { http, config }
    }

    async fn post<T, R>(&self, path: &str, body: &T) -> AppResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (client_id, secret) = match (&self.config.client_id, &self.config.secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(AppError::Internal(
                    "PLAID_CLIENT_ID / PLAID_SECRET are not set".into(),
                ))
            }
        };

        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .header("PLAID-CLIENT-ID", client_id)
            .header("PLAID-SECRET", secret)
            .json(body)
            .send()
            .await?;

        let parsed = check_status(SERVICE, resp).await?.json().await?;
        Ok(parsed)
    }

    pub async fn create_link_token(&self, user: &User) -> AppResult<String> {
        let body = json!({
            "user": {
                "client_user_id": user.id,
                "legal_name": user.full_name(),
                "email_address": user.email,
            },
            "client_name": self.config.client_name,
            "products": ["auth", "transactions"],
            "language": "en",
            "country_codes": ["US"],
        });
        let resp: LinkTokenResponse = self.post("/link/token/create", &body).await?;
        Ok(resp.link_token)
    }

    pub async fn exchange_public_token(&self, public_token: &str) -> AppResult<TokenExchange> {
        self.post(
            "/item/public_token/exchange",
            &json!({ "public_token": public_token }),
        )
        .await
    }

    pub async fn get_accounts(&self, access_token: &str) -> AppResult<AccountsResponse> {
        self.post("/accounts/get", &json!({ "access_token": access_token }))
            .await
    }

    pub async fn create_processor_token(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> AppResult<String> {
        let resp: ProcessorTokenResponse = self
            .post(
                "/processor/token/create",
                &json!({
                    "access_token": access_token,
                    "account_id": account_id,
                    "processor": PAYMENT_PROCESSOR,
                }),
            )
            .await?;
        Ok(resp.processor_token)
    }

    pub async fn get_institution(&self, institution_id: &str) -> AppResult<Institution> {
        let resp: InstitutionResponse = self
            .post(
                "/institutions/get_by_id",
                &json!({ "institution_id": institution_id, "country_codes": ["US"] }),
            )
            .await?;
        Ok(resp.institution)
    }

    /// Pull every page of added transactions for an item.
    ///
    /// Stops early when the cursor stops advancing or after
    /// [`MAX_SYNC_PAGES`] pages.
    pub async fn get_transactions(&self, access_token: &str) -> AppResult<Vec<PlaidTransaction>> {
        let mut cursor: Option<String> = None;
        let mut transactions = Vec::new();

        for pages in 1..=MAX_SYNC_PAGES {
            let mut body = json!({ "access_token": access_token });
            if let Some(ref c) = cursor {
                body["cursor"] = json!(c);
            }
            let page: TransactionsSyncResponse = self.post("/transactions/sync", &body).await?;
            transactions.extend(page.added);
            if !page.has_more {
                break;
            }
            if cursor.as_deref() == Some(page.next_cursor.as_str()) {
                tracing::warn!(
                    "{SERVICE} sync cursor did not advance after {pages} pages, stopping"
                );
                break;
            }
            if pages == MAX_SYNC_PAGES {
                tracing::warn!("{SERVICE} sync still has more after {pages} pages, stopping");
            }
            cursor = Some(page.next_cursor);
        }

        tracing::debug!("Fetched {} transactions from {SERVICE}", transactions.len());
        Ok(transactions)
    }
}
