#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use horizon_server::config::{AppwriteConfig, CheckbookConfig, Config, DwollaConfig, PlaidConfig};
use horizon_server::db;
use horizon_server::routes::{create_router, AppState};
use horizon_server::services::identity::query_equal;

pub const SECRET: &str = "session-secret-1";
pub const ACCOUNT_ID: &str = "acct-1";
pub const USER_DOC_ID: &str = "user-doc-1";
pub const CUSTOMER_ID: &str = "cust-1";

pub struct TestApp {
    pub router: Router,
    pub vendor: MockServer,
    pub state: AppState,
    _dir: TempDir,
}

pub fn test_config(vendor_uri: &str, sqlite_path: &str) -> Config {
    Config {
        server_port: 0,
        cors_origin: "http://localhost:3000".to_string(),
        sqlite_path: sqlite_path.to_string(),
        appwrite: AppwriteConfig {
            endpoint: format!("{vendor_uri}/v1"),
            project_id: "horizon-test".to_string(),
            api_key: Some("appwrite-key".to_string()),
            database_id: "bank".to_string(),
            user_collection_id: "users".to_string(),
            bank_collection_id: "banks".to_string(),
            transaction_collection_id: "transactions".to_string(),
        },
        plaid: PlaidConfig {
            base_url: format!("{vendor_uri}/plaid"),
            client_id: Some("plaid-client".to_string()),
            secret: Some("plaid-secret".to_string()),
            client_name: "Horizon".to_string(),
        },
        dwolla: DwollaConfig {
            base_url: format!("{vendor_uri}/dwolla"),
            key: Some("dwolla-key".to_string()),
            secret: Some("dwolla-secret".to_string()),
        },
        checkbook: CheckbookConfig {
            base_url: format!("{vendor_uri}/checkbook"),
            api_key: Some("cb-key".to_string()),
            api_secret: Some("cb-secret".to_string()),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    let vendor = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let sqlite_path = dir.path().join("horizon.db");
    let config = test_config(&vendor.uri(), sqlite_path.to_str().unwrap());
    let pool = db::create_pool(&config.sqlite_path);
    let state = AppState::new(config, pool);

    TestApp {
        router: create_router(state.clone()),
        vendor,
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
        extra_headers: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.7");
        if let Some(secret) = cookie {
            builder = builder.header(header::COOKIE, format!("horizon_session={secret}"));
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub fn vendor_url(&self, path: &str) -> String {
        format!("{}{path}", self.vendor.uri())
    }
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn user_doc() -> Value {
    json!({
        "$id": USER_DOC_ID,
        "$collectionId": "users",
        "userId": ACCOUNT_ID,
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "address1": "1 Main St",
        "city": "Brooklyn",
        "state": "NY",
        "postalCode": "11201",
        "dateOfBirth": "1990-12-10",
        "dwollaCustomerId": CUSTOMER_ID,
        "dwollaCustomerUrl": format!("https://api-sandbox.dwolla.com/customers/{CUSTOMER_ID}"),
    })
}

pub fn bank_doc(id: &str, user_id: &str, account_id: &str, funding_source: &str) -> Value {
    json!({
        "$id": id,
        "userId": user_id,
        "bankId": format!("item-{id}"),
        "accountId": account_id,
        "accessToken": format!("access-{id}"),
        "fundingSourceUrl": funding_source,
        "shareableId": base64_encode(account_id),
    })
}

pub fn base64_encode(value: &str) -> String {
    horizon_server::services::transfers::encode_shareable_id(value)
}

/// Profile lookup by provider account id.
pub async fn mount_user_info(vendor: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/databases/bank/collections/users/documents"))
        .and(query_param("queries[]", query_equal("userId", ACCOUNT_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "total": 1, "documents": [user_doc()] })),
        )
        .mount(vendor)
        .await;
}

/// Make `SECRET` a valid session for `ACCOUNT_ID`.
pub async fn mount_session(vendor: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(header_eq("X-Appwrite-Session", SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$id": ACCOUNT_ID,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
        })))
        .mount(vendor)
        .await;
    mount_user_info(vendor).await;
}

pub async fn mount_dwolla_token(vendor: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/dwolla/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "dwolla-access",
            "token_type": "bearer",
            "expires_in": 3600,
        })))
        .mount(vendor)
        .await;
}
