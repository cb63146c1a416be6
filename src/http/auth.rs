//! Bearer-token extraction for per-player endpoints

use axum::http::{header, HeaderMap};

use crate::game::players::TOKEN_LENGTH;

use super::ApiError;

/// Pull the player token out of `Authorization: Bearer <32 hex>`.
///
/// Anything structurally wrong (missing header, different scheme, wrong
/// length, non-hex characters) is `invalidToken`; whether the token is
/// actually known is the registry's call.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::InvalidToken)?;

    let token = value.strip_prefix("Bearer ").ok_or(ApiError::InvalidToken)?;

    if token.len() != TOKEN_LENGTH
        || !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return Err(ApiError::InvalidToken);
    }

    Ok(token)
}
