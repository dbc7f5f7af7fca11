pub mod auth;
pub mod health;
pub mod tasks;

use crate::error::AppError;

/// Fallback for unknown paths: the error envelope with 404.
pub async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}

/// Fallback for a known path hit with a method it does not route.
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed("Method not allowed")
}
