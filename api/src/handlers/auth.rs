//! Sign-in handlers
//!
//! Passwordless email links. The link request returns the PKCE verifier,
//! which the client sends back together with the code from the link.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AccessToken;
use crate::domain::entities::{AuthSession, AuthUser};
use crate::error::AppError;
use crate::AppState;

/// Request body for a sign-in link
#[derive(Debug, Deserialize)]
pub struct RequestLinkRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct RequestLinkResponse {
    pub message: String,
    pub email: String,
    /// Send back as `code_verifier` on `/auth/callback`
    pub code_verifier: String,
}

/// Query parameters on the link target
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub code_verifier: String,
}

/// POST /auth/request-link
pub async fn request_link(
    State(state): State<AppState>,
    Json(request): Json<RequestLinkRequest>,
) -> Result<Json<RequestLinkResponse>, AppError> {
    let sent = state.auth_service.request_magic_link(&request.email).await?;

    Ok(Json(RequestLinkResponse {
        message: format!("Check {} for a sign-in link", sent.email),
        email: sent.email,
        code_verifier: sent.code_verifier,
    }))
}

/// GET /auth/callback?code=&code_verifier=
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<AuthSession>, AppError> {
    let session = state
        .auth_service
        .complete_sign_in(&query.code, &query.code_verifier)
        .await?;
    Ok(Json(session))
}

/// POST /auth/signout
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(token): Extension<AccessToken>,
) -> Result<StatusCode, AppError> {
    state.auth_service.sign_out(&token.0).await?;
    tracing::info!(user_id = %user.id, "User signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /me
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
