//! Identity provider port trait
//!
//! Defines the interface for the hosted authentication service
//! (passwordless email links with PKCE).

use async_trait::async_trait;

use crate::domain::entities::{AuthSession, AuthUser};
use crate::error::IdentityError;

/// Client for the hosted identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user behind an access token. `None` if the token is not valid.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError>;

    /// Send a passwordless sign-in link to `email`.
    ///
    /// The link lands on `redirect_to` with a `code` that can be exchanged
    /// together with the verifier matching `code_challenge`.
    async fn request_magic_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError>;

    /// Exchange a sign-in code for a session
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}
