use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use todo_core::types::TokenKind;

use crate::error::AppError;
use crate::state::AppState;

/// Pull the token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Axum middleware guarding the task and profile routes.
///
/// A valid access token puts its `AuthUser` into the request extensions;
/// anything else is answered with 401 before the handler runs.
pub async fn require_bearer(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let Some(value) = header_value else {
        return Err(AppError::unauthorized("Missing bearer token"));
    };
    let Some(token) = bearer_token(value) else {
        return Err(AppError::unauthorized("Malformed authorization header"));
    };

    let user = app.tokens.verify(token, TokenKind::Access)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
