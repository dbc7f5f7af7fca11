use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::{Deserialize, Serialize};
use todo_core::auth::{self, AuthUser, TokenPair};
use todo_core::repo::UserRepository;
use todo_core::types::TokenKind;
use todo_core::user::User;
use todo_core::TodoError;

use crate::error::AppError;
use crate::response::{ApiJson, ApiResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshBody {
    pub refresh_token: String,
}

/// `data` payload of every auth endpoint that issues tokens.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Run an Argon2 operation off the async runtime without holding the db lock.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))
}

/// POST /api/v1/auth/signup: register and sign in.
pub async fn signup(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<CredentialsBody>,
) -> Result<(StatusCode, ApiResponse<AuthPayload>), AppError> {
    let email = auth::normalize_email(&body.email)?;
    auth::validate_password(&body.password)?;

    let password = body.password;
    let hash = blocking(move || auth::hash_password(&password)).await??;

    let user = app
        .with_repo(move |repo| repo.create_user(&email, &hash))
        .await?;
    tracing::info!(user_id = %user.id, "account created");

    let tokens = app.tokens.issue_pair(&user)?;
    Ok(ApiResponse::created(
        "Account created successfully",
        AuthPayload { user, tokens },
    ))
}

/// POST /api/v1/auth/login: exchange credentials for a token pair.
pub async fn login(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<CredentialsBody>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    // Malformed addresses fall through to the unknown-account path.
    let email = auth::normalize_email(&body.email)
        .unwrap_or_else(|_| body.email.trim().to_lowercase());

    let user = app
        .with_repo(move |repo| repo.find_user_by_email(&email))
        .await?;

    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let password = body.password;
    let ok = blocking(move || auth::verify_login(&password, stored.as_deref())).await?;

    let user = match user {
        Some(user) if ok => user,
        _ => {
            tracing::debug!("login rejected");
            return Err(TodoError::InvalidCredentials.into());
        }
    };

    let tokens = app.tokens.issue_pair(&user)?;
    Ok(ApiResponse::ok("Login successful", AuthPayload { user, tokens }))
}

/// POST /api/v1/auth/refresh: trade a refresh token for a new pair.
pub async fn refresh(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<RefreshBody>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    let who = app.tokens.verify(&body.refresh_token, TokenKind::Refresh)?;

    let user = app
        .with_repo(move |repo| repo.find_user_by_id(who.user_id))
        .await?
        .ok_or(TodoError::InvalidToken)?;

    let tokens = app.tokens.issue_pair(&user)?;
    Ok(ApiResponse::ok(
        "Token refreshed successfully",
        AuthPayload { user, tokens },
    ))
}

/// GET /api/v1/auth/me: the authenticated account.
pub async fn me(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
) -> Result<ApiResponse<User>, AppError> {
    let user = app
        .with_repo(move |repo| repo.find_user_by_id(who.user_id))
        .await?
        .ok_or(TodoError::InvalidToken)?;
    Ok(ApiResponse::ok("User retrieved successfully", user))
}
