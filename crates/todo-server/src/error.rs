use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use todo_core::error::TodoError;

// ---------------------------------------------------------------------------
// Internal sentinels for errors that have no TodoError counterpart
// ---------------------------------------------------------------------------

/// Carries an explicit 401 (with its own message) through the
/// `anyhow::Error` chain.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

/// Carries an explicit 404 through the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

/// Carries a 405 for a known path hit with an unrouted method.
#[derive(Debug)]
struct MethodNotAllowedError(String);

impl std::fmt::Display for MethodNotAllowedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MethodNotAllowedError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Renders
/// `{success: false, message, error_type}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// 400 Bad Request with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(TodoError::Validation(msg.into()).into())
    }

    /// 401 Unauthorized with the given message.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    /// 404 Not Found with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    /// 405 Method Not Allowed with the given message.
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self(MethodNotAllowedError(msg.into()).into())
    }

    /// Status, `error_type`, and client-facing message.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        if let Some(u) = self.0.downcast_ref::<UnauthorizedError>() {
            return (StatusCode::UNAUTHORIZED, "unauthorized", u.0.clone());
        }
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            return (StatusCode::NOT_FOUND, "not_found", n.0.clone());
        }
        if let Some(m) = self.0.downcast_ref::<MethodNotAllowedError>() {
            return (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                m.0.clone(),
            );
        }

        let Some(e) = self.0.downcast_ref::<TodoError>() else {
            return internal();
        };
        match e {
            TodoError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            TodoError::InvalidCredentials | TodoError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "unauthorized", e.to_string())
            }
            TodoError::TaskNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found", "Task not found".to_string())
            }
            TodoError::EmailTaken => (StatusCode::CONFLICT, "conflict", e.to_string()),
            TodoError::NotInitialized
            | TodoError::TokenIssue(_)
            | TodoError::PasswordHash(_)
            | TodoError::UnsupportedSchemaVersion { .. }
            | TodoError::CorruptRecord(_)
            | TodoError::Sqlite(_)
            | TodoError::Io(_)
            | TodoError::Yaml(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        } else {
            tracing::debug!(%status, error_type, "request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "message": message,
            "error_type": error_type,
        });
        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
