//! HTTP surface: API routes, auth, and the error taxonomy

pub mod auth;
pub mod errors;
pub mod routes;

pub use errors::ApiError;
pub use routes::build_router;
