//! Refresh-token cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use sso_auth::jwt::encoder::REFRESH_TTL_DAYS;

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Build a httpOnly cookie for the refresh token.
pub fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(REFRESH_TTL_DAYS))
        .build()
}

/// Build an expired cookie to clear the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let rendered = refresh_cookie("abc", false).to_string();
        assert!(rendered.starts_with("refresh_token=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Max-Age=2592000"));
        assert!(!rendered.contains("Secure"));

        assert!(refresh_cookie("abc", true).to_string().contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let rendered = clear_refresh_cookie(false).to_string();
        assert!(rendered.starts_with("refresh_token=;"));
        assert!(rendered.contains("Max-Age=0"));
    }
}
