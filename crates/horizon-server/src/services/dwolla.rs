//! Payment network client: customers, on-demand authorizations, funding
//! sources and transfers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::DwollaConfig;
use crate::error::{check_status, AppError, AppResult};

const SERVICE: &str = "dwolla";
const HAL_JSON: &str = "application/vnd.dwolla.v1.hal+json";

/// Refresh the OAuth token this long before the network expires it.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Every transfer is denominated in this currency.
pub const TRANSFER_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

pub type Links = BTreeMap<String, Link>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub customer_type: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: String,
    pub ssn: String,
}

/// Authorization grant required before a funding source can be attached.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDemandAuthorization {
    #[serde(rename = "_links")]
    pub links: Links,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub button_text: String,
}

impl OnDemandAuthorization {
    /// Links a funding-source request must carry to reference this grant.
    pub fn funding_source_links(&self) -> AppResult<Links> {
        let grant = self.links.get("self").ok_or_else(|| AppError::Upstream {
            service: SERVICE,
            status: 200,
            message: "on-demand authorization has no self link".into(),
        })?;
        let mut links = Links::new();
        links.insert("on-demand-authorization".to_string(), grant.clone());
        Ok(links)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSourceRequest {
    pub name: String,
    pub plaid_token: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferLinks {
    pub source: Link,
    pub destination: Link,
}

#[derive(Debug, Clone, Serialize)]
pub struct Amount {
    pub currency: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    #[serde(rename = "_links")]
    pub links: TransferLinks,
    pub amount: Amount,
}

impl TransferRequest {
    /// Build a transfer between two funding-source URLs. The amount is sent with two decimals.
    pub fn new(source_funding_source_url: &str, destination_funding_source_url: &str, amount: Decimal) -> Self {
        let mut value = amount;
        value.rescale(2);
        Self {
            links: TransferLinks {
                source: Link {
                    href: source_funding_source_url.to_string(),
                },
                destination: Link {
                    href: destination_funding_source_url.to_string(),
                },
            },
            amount: Amount {
                currency: TRANSFER_CURRENCY.to_string(),
                value: value.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Last path segment of a resource URL, e.g. the customer id of `.../customers/{id}`.
pub fn resource_id(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

#[derive(Clone)]
pub struct DwollaClient {
    http: Client,
    config: DwollaConfig,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl DwollaClient {
    pub fn new(http: Client, config: DwollaConfig) -> Self {
        Self {
            http,
            config,
            token: Arc::new(Mutex::new(None)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let (key, secret) = match (&self.config.key, &self.config.secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => return Err(AppError::Internal("DWOLLA_KEY / DWOLLA_SECRET are not set".into())),
        };

        let resp = self
            .http
            .post(self.url("/token"))
            .basic_auth(key, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = check_status(SERVICE, resp).await?.json().await?;

        tracing::debug!("Refreshed {SERVICE} access token, expires in {}s", token.expires_in);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        idempotency_key: Option<&str>,
    ) -> AppResult<Response> {
        let token = self.access_token().await?;
        let mut req = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .header("Accept", HAL_JSON)
            .header("Content-Type", HAL_JSON)
            .body(serde_json::to_vec(body).map_err(|e| AppError::Internal(e.to_string()))?);
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }
        check_status(SERVICE, req.send().await?).await
    }

    fn location(resp: &Response) -> AppResult<String> {
        resp.headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream {
                service: SERVICE,
                status: resp.status().as_u16(),
                message: "response has no Location header".into(),
            })
    }

    /// Create a customer and return its resource URL.
    pub async fn create_customer(&self, customer: &NewCustomer) -> AppResult<String> {
        let resp = self.post("/customers", customer, None).await?;
        let url = Self::location(&resp)?;
        tracing::info!("Created {SERVICE} customer {}", resource_id(&url));
        Ok(url)
    }

    pub async fn create_on_demand_authorization(&self) -> AppResult<OnDemandAuthorization> {
        let resp = self
            .post("/on-demand-authorizations", &serde_json::json!({}), None)
            .await?;
        let auth = resp.json().await?;
        Ok(auth)
    }

    /// Attach a funding source to a customer and return its resource URL.
    pub async fn create_funding_source(
        &self,
        customer_id: &str,
        request: &FundingSourceRequest,
    ) -> AppResult<String> {
        let resp = self
            .post(&format!("/customers/{customer_id}/funding-sources"), request, None)
            .await?;
        Self::location(&resp)
    }

    /// Initiate a transfer and return its resource URL.
    pub async fn create_transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: Option<&str>,
    ) -> AppResult<String> {
        let resp = self.post("/transfers", request, idempotency_key).await?;
        Self::location(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transfer_body_is_always_usd_with_two_decimals() {
        let req = TransferRequest::new(
            "https://api/funding-sources/a",
            "https://api/funding-sources/b",
            Decimal::from_str("10").unwrap(),
        );
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["amount"]["currency"], "USD");
        assert_eq!(body["amount"]["value"], "10.00");
        assert_eq!(body["_links"]["source"]["href"], "https://api/funding-sources/a");
        assert_eq!(body["_links"]["destination"]["href"], "https://api/funding-sources/b");
    }

    #[test]
    fn funding_source_body_carries_authorization_links() {
        let mut links = Links::new();
        links.insert(
            "on-demand-authorization".into(),
            Link { href: "https://api/on-demand-authorizations/x".into() },
        );
        let body = serde_json::to_value(FundingSourceRequest {
            name: "Checking".into(),
            plaid_token: "processor-sandbox-1".into(),
            links,
        })
        .unwrap();
        assert_eq!(body["plaidToken"], "processor-sandbox-1");
        assert_eq!(
            body["_links"]["on-demand-authorization"]["href"],
            "https://api/on-demand-authorizations/x"
        );
    }

    #[test]
    fn authorization_self_link_becomes_grant_reference() {
        let auth: OnDemandAuthorization = serde_json::from_value(serde_json::json!({
            "_links": { "self": { "href": "https://api/on-demand-authorizations/x" } },
            "bodyText": "I agree",
            "buttonText": "Agree",
        }))
        .unwrap();
        let links = auth.funding_source_links().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(
            links["on-demand-authorization"].href,
            "https://api/on-demand-authorizations/x"
        );

        let empty = OnDemandAuthorization {
            links: Links::new(),
            body_text: String::new(),
            button_text: String::new(),
        };
        assert!(empty.funding_source_links().is_err());
    }

    #[test]
    fn resource_id_takes_last_segment() {
        assert_eq!(resource_id("https://api-sandbox.dwolla.com/customers/abc-123"), "abc-123");
        assert_eq!(resource_id("https://api-sandbox.dwolla.com/customers/abc-123/"), "abc-123");
    }
}
