mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::*;

fn sign_up_body() -> serde_json::Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "address1": "1 Main St",
        "city": "Brooklyn",
        "state": "ny",
        "postalCode": "11201",
        "dateOfBirth": "1990-12-10",
        "ssn": "1234",
        "email": "ada@example.com",
        "password": "analytical-engine",
    })
}

fn assert_session_cookie(cookies: &[String], secret: &str) {
    let cookie = cookies
        .iter()
        .find(|c| c.starts_with("horizon_session="))
        .expect("session cookie set");
    assert!(cookie.starts_with(&format!("horizon_session={secret}")), "{cookie}");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("SameSite=Strict"), "{cookie}");
    assert!(cookie.contains("Secure"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
}

#[tokio::test]
async fn sign_up_then_sign_in_creates_one_account_and_two_sessions() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/account"))
        .and(header("X-Appwrite-Key", "appwrite-key"))
        .and(body_partial_json(json!({ "email": "ada@example.com", "name": "Ada Lovelace" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$id": ACCOUNT_ID,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
        })))
        .expect(1)
        .mount(&app.vendor)
        .await;

    mount_dwolla_token(&app.vendor).await;
    Mock::given(method("POST"))
        .and(path("/dwolla/customers"))
        .and(body_partial_json(json!({ "type": "personal", "state": "NY" })))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!("https://api-sandbox.dwolla.com/customers/{CUSTOMER_ID}").as_str(),
        ))
        .expect(1)
        .mount(&app.vendor)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/databases/bank/collections/users/documents"))
        .and(body_partial_json(json!({
            "data": { "userId": ACCOUNT_ID, "dwollaCustomerId": CUSTOMER_ID }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_doc()))
        .expect(1)
        .mount(&app.vendor)
        .await;

    for secret in ["secret-from-sign-up", "secret-from-sign-in"] {
        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": format!("session-{secret}"),
                "userId": ACCOUNT_ID,
                "secret": secret,
                "expire": "2030-01-01T00:00:00.000+00:00",
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&app.vendor)
            .await;
    }
    mount_user_info(&app.vendor).await;

    let resp = app
        .request(Method::POST, "/api/v1/auth/sign-up", Some(sign_up_body()), None, &[])
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_session_cookie(&set_cookies(&resp), "secret-from-sign-up");
    let user = body_json(resp).await;
    assert_eq!(user["$id"], USER_DOC_ID);
    assert_eq!(user["dwollaCustomerId"], CUSTOMER_ID);

    let resp = app
        .request(
            Method::POST,
            "/api/v1/auth/sign-in",
            Some(json!({ "email": "ada@example.com", "password": "analytical-engine" })),
            None,
            &[],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_session_cookie(&set_cookies(&resp), "secret-from-sign-in");
    assert_eq!(body_json(resp).await["email"], "ada@example.com");

    app.vendor.verify().await;
}

#[tokio::test]
async fn invalid_sign_up_never_reaches_the_provider() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/account"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.vendor)
        .await;

    let mut body = sign_up_body();
    body["state"] = json!("New York");
    let resp = app
        .request(Method::POST, "/api/v1/auth/sign-up", Some(body), None, &[])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&resp).is_empty());
}

#[tokio::test]
async fn customer_failure_aborts_sign_up_without_session() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/account"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$id": ACCOUNT_ID, "name": "Ada Lovelace", "email": "ada@example.com",
        })))
        .mount(&app.vendor)
        .await;
    mount_dwolla_token(&app.vendor).await;
    Mock::given(method("POST"))
        .and(path("/dwolla/customers"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "code": "ValidationError" })))
        .mount(&app.vendor)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/email"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.vendor)
        .await;

    let resp = app
        .request(Method::POST, "/api/v1/auth/sign-up", Some(sign_up_body()), None, &[])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(body_json(resp).await["error"], "Upstream service error");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/email"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid credentials", "code": 401,
        })))
        .mount(&app.vendor)
        .await;

    let resp = app
        .request(
            Method::POST,
            "/api/v1/auth/sign-in",
            Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
            None,
            &[],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&resp).is_empty());
}

#[tokio::test]
async fn logout_drops_cookie_and_deletes_session() {
    let app = spawn_app().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/account/sessions/current"))
        .and(header("X-Appwrite-Session", SECRET))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.vendor)
        .await;

    let resp = app
        .request(Method::POST, "/api/v1/auth/logout", None, Some(SECRET), &[])
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let cookies = set_cookies(&resp);
    assert!(cookies.iter().any(|c| c.starts_with("horizon_session=;") && c.contains("Max-Age=0")));
    assert_eq!(body_json(resp).await["ok"], true);
}

#[tokio::test]
async fn logout_failure_still_drops_cookie_but_reports_error() {
    let app = spawn_app().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/account/sessions/current"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.vendor)
        .await;

    let resp = app
        .request(Method::POST, "/api/v1/auth/logout", None, Some(SECRET), &[])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&resp)
        .iter()
        .any(|c| c.starts_with("horizon_session=;") && c.contains("Max-Age=0")));
    assert!(body_json(resp).await.get("ok").is_none());
}

#[tokio::test]
async fn me_requires_a_valid_session() {
    let app = spawn_app().await;
    mount_session(&app.vendor).await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(header("X-Appwrite-Session", "expired"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.vendor)
        .await;

    let resp = app.request(Method::GET, "/api/v1/auth/me", None, None, &[]).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .request(Method::GET, "/api/v1/auth/me", None, Some("expired"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .request(Method::GET, "/api/v1/auth/me", None, Some(SECRET), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["firstName"], "Ada");
    assert_eq!(user["userId"], ACCOUNT_ID);
}
