use axum_extra::extract::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE: &str = "horizon_session";

/// Cookie carrying the identity provider's session secret.
pub fn session_cookie(secret: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, secret))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Expired cookie that makes the browser drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}
