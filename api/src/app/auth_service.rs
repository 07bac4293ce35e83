//! Auth service
//!
//! Passwordless sign-in against the hosted identity service. The magic link
//! uses PKCE: a random verifier is generated here, its S256 challenge goes
//! out with the link request, and the verifier comes back with the code.

use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::entities::{AuthSession, AuthUser};
use crate::domain::ports::IdentityProvider;
use crate::error::AppError;

const UNCONFIGURED: &str = "SUPABASE_URL and SUPABASE_ANON_KEY must be set";

/// Returned after a magic link is sent. The caller keeps `code_verifier`
/// and presents it with the code from the link.
#[derive(Debug, Clone, Serialize)]
pub struct MagicLinkRequest {
    pub email: String,
    pub code_verifier: String,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Validate and normalize an email address
fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if !email_pattern().is_match(email) {
        return Err(AppError::BadRequest(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(email.to_lowercase())
}

/// Generate a PKCE code verifier (43 URL-safe characters)
pub fn generate_code_verifier() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 challenge for a verifier
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub struct AuthService<IP>
where
    IP: IdentityProvider,
{
    identity: Option<Arc<IP>>,
    redirect_url: String,
}

impl<IP> AuthService<IP>
where
    IP: IdentityProvider,
{
    /// `identity` is `None` when the identity service is not configured.
    pub fn new(identity: Option<Arc<IP>>, redirect_url: String) -> Self {
        Self {
            identity,
            redirect_url,
        }
    }

    fn identity(&self) -> Result<&IP, AppError> {
        self.identity
            .as_deref()
            .ok_or_else(|| AppError::Unconfigured(UNCONFIGURED.to_string()))
    }

    /// Send a sign-in link to `email`
    pub async fn request_magic_link(&self, email: &str) -> Result<MagicLinkRequest, AppError> {
        let email = validate_email(email)?;
        let identity = self.identity()?;

        let code_verifier = generate_code_verifier();
        identity
            .request_magic_link(&email, &self.redirect_url, &code_challenge(&code_verifier))
            .await?;

        tracing::info!(email = %email, "Sent sign-in link");
        Ok(MagicLinkRequest {
            email,
            code_verifier,
        })
    }

    /// Exchange the code from a sign-in link for a session
    pub async fn complete_sign_in(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AppError> {
        let identity = self.identity()?;
        if code.trim().is_empty() {
            return Err(AppError::BadRequest("Missing sign-in code".to_string()));
        }
        if code_verifier.trim().is_empty() {
            return Err(AppError::BadRequest("Missing code verifier".to_string()));
        }

        let session = identity.exchange_code(code, code_verifier).await?;
        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }

    /// Resolve the user behind an access token
    pub async fn resolve_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        self.identity()?
            .get_user(access_token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.identity()?.sign_out(access_token).await?;
        Ok(())
    }
}
