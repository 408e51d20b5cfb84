use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::auth::cookie::SESSION_COOKIE;
use crate::error::AppError;
use crate::routes::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let secret = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let account = state.identity.get_current_account(&secret).await?;
    let user = state
        .identity
        .get_user_info(&account.id)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::Unauthorized,
            e => e,
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
