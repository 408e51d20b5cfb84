use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::auth::cookie::{removal_cookie, session_cookie, SESSION_COOKIE};
use crate::auth::forms::{SignInForm, SignUpForm};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::routes::AppState;
use crate::services::dwolla::{resource_id, NewCustomer};

/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SignUpForm>,
) -> AppResult<impl IntoResponse> {
    form.validate()?;

    let account = state
        .identity
        .create_account(&form.email, &form.password, &form.full_name())
        .await?;

    let customer_url = state
        .dwolla
        .create_customer(&NewCustomer {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            customer_type: "personal".to_string(),
            address1: form.address1.clone(),
            city: form.city.clone(),
            state: form.state.to_uppercase(),
            postal_code: form.postal_code.clone(),
            date_of_birth: form.date_of_birth.clone(),
            ssn: form.ssn.clone(),
        })
        .await?;

    let user = state
        .identity
        .create_user_info(&NewUser {
            user_id: account.id,
            email: form.email.clone(),
            first_name: form.first_name,
            last_name: form.last_name,
            address1: form.address1,
            city: form.city,
            state: form.state.to_uppercase(),
            postal_code: form.postal_code,
            date_of_birth: form.date_of_birth,
            dwolla_customer_id: resource_id(&customer_url).to_string(),
            dwolla_customer_url: customer_url,
        })
        .await?;

    let session = state
        .identity
        .create_email_password_session(&form.email, &form.password)
        .await?;
    tracing::info!("New user signed up: {}", user.id);

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(session.secret)),
        Json(user),
    ))
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SignInForm>,
) -> AppResult<impl IntoResponse> {
    form.validate()?;

    let session = state
        .identity
        .create_email_password_session(&form.email, &form.password)
        .await?;
    let user = state.identity.get_user_info(&session.user_id).await?;

    Ok((jar.add(session_cookie(session.secret)), Json(user)))
}

/// POST /api/v1/auth/logout
///
/// The cookie is dropped even when the provider refuses to delete the session.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, AppResult<Json<Value>>) {
    let secret = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let jar = jar.add(removal_cookie());

    let result = match secret {
        Some(secret) => state
            .identity
            .delete_current_session(&secret)
            .await
            .map(|_| Json(json!({ "ok": true }))),
        None => Err(AppError::Unauthorized),
    };

    (jar, result)
}

/// GET /api/v1/auth/me
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
