//! Bearer session middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::AppState;

/// Access token presented by the caller, kept in extensions for sign-out
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// Extract the access token from the Authorization header
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
///
/// Resolves the bearer token against the identity service and injects the
/// `AuthUser` and `AccessToken` into request extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = state.auth_service.resolve_user(&token).await?;
    tracing::debug!(user_id = %user.id, "Authenticated request");

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(AccessToken(token));

    Ok(next.run(request).await)
}
