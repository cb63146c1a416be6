//! API error taxonomy
//!
//! Every API failure maps to a `{"code": ..., "message": ...}` body with a
//! fixed status code. The `Allow` header rides along on method errors.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("method not allowed")]
    InvalidMethod { allow: &'static str },

    #[error("authorization header is missing or malformed")]
    InvalidToken,

    #[error("player token has not been found")]
    UnknownToken,

    #[error("map not found")]
    MapNotFound,

    #[error("page not found")]
    PageNotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidMethod { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::UnknownToken => StatusCode::UNAUTHORIZED,
            ApiError::MapNotFound => StatusCode::NOT_FOUND,
            ApiError::PageNotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "invalidArgument",
            ApiError::InvalidMethod { .. } => "invalidMethod",
            ApiError::InvalidToken => "invalidToken",
            ApiError::UnknownToken => "unknownToken",
            ApiError::MapNotFound => "mapNotFound",
            ApiError::PageNotFound => "pageNotFound",
            ApiError::BadRequest(_) => "badRequest",
            ApiError::Internal(_) => "internalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code(),
            "message": self.to_string(),
        });

        let mut response = (self.status(), Json(body)).into_response();
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        );
        if let ApiError::InvalidMethod { allow } = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_the_taxonomy() {
        assert_eq!(ApiError::InvalidArgument("x".into()).code(), "invalidArgument");
        assert_eq!(ApiError::UnknownToken.code(), "unknownToken");
        assert_eq!(ApiError::MapNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidMethod { allow: "POST" }.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn method_error_carries_the_allow_header() {
        let response = ApiError::InvalidMethod { allow: "GET, HEAD" }.into_response();
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    }
}
