//! Auth handlers: login, register, refresh, logout, password reset,
//! token validation.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use sso_auth::AuthRequest;
use sso_core::error::AppError;

use crate::cookies::{REFRESH_COOKIE, clear_refresh_cookie, refresh_cookie};
use crate::dto::request::{
    LoginRequest, PasswordResetComplete, PasswordResetRequest, RegisterRequest,
};
use crate::dto::response::{
    ApiResponse, AuthTokenResponse, MessageResponse, ResetTokenResponse, TokenInfoResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

type TokenReply = (CookieJar, Json<ApiResponse<AuthTokenResponse>>);

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<TokenReply, ApiError> {
    req.validate()?;
    authenticate(&state, jar, req.into(), false).await
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<TokenReply, ApiError> {
    req.validate()?;
    authenticate(&state, jar, req.into(), true).await
}

async fn authenticate(
    state: &AppState,
    jar: CookieJar,
    request: AuthRequest,
    is_registration: bool,
) -> Result<TokenReply, ApiError> {
    let result = state
        .auth
        .authenticate_or_register(&request, is_registration)
        .await?;

    let secure = state.config.server.secure_cookies;
    let jar = jar.add(refresh_cookie(&result.tokens.refresh_token, secure));
    Ok((jar, Json(ApiResponse::ok(result.into()))))
}

/// POST /auth/refresh
///
/// Reads the refresh token from its cookie. Any failure clears the cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<TokenReply, (CookieJar, ApiError)> {
    let secure = state.config.server.secure_cookies;

    let token = match jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()) {
        Some(token) if !token.is_empty() => token,
        _ => {
            let err = AppError::invalid_token("Refresh cookie is missing");
            return Err((jar.add(clear_refresh_cookie(secure)), err.into()));
        }
    };

    match state.auth.refresh(&token).await {
        Ok(result) => {
            let jar = jar.add(refresh_cookie(&result.tokens.refresh_token, secure));
            Ok((jar, Json(ApiResponse::ok(result.into()))))
        }
        Err(err) => Err((jar.add(clear_refresh_cookie(secure)), err.into())),
    }
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    let jar = jar.add(clear_refresh_cookie(state.config.server.secure_cookies));
    (
        jar,
        Json(ApiResponse::ok(MessageResponse {
            message: "Logged out".to_string(),
        })),
    )
}

/// POST /auth/password/request
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<Json<ApiResponse<ResetTokenResponse>>, ApiError> {
    req.validate()?;
    let token = state.auth.request_reset(&req.login).await?;
    Ok(Json(ApiResponse::ok(ResetTokenResponse { token })))
}

/// POST /auth/password/complete
pub async fn complete_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetComplete>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state
        .auth
        .complete_reset(&req.token, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Password updated".to_string(),
    })))
}

/// GET /auth/validate
pub async fn validate(auth: AuthUser) -> Json<ApiResponse<TokenInfoResponse>> {
    Json(ApiResponse::ok(auth.0.into()))
}
