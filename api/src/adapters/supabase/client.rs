//! Supabase Auth API client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use urlencoding::encode;
use uuid::Uuid;

use crate::domain::entities::{AuthSession, AuthUser, UserId};
use crate::domain::ports::IdentityProvider;
use crate::error::IdentityError;

/// Implementation of the Supabase Auth client
pub struct SupabaseAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuthClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, IdentityError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| IdentityError::Deserialization(e.to_string()))
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), IdentityError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

async fn error_from_response(response: reqwest::Response) -> IdentityError {
    match response.status().as_u16() {
        429 => IdentityError::RateLimited,
        401 => {
            let message = extract_error_message(&response.text().await.unwrap_or_default());
            if is_api_key_rejection(&message) {
                IdentityError::Misconfigured(message)
            } else {
                IdentityError::Unauthorized
            }
        }
        status => {
            let body = response.text().await.unwrap_or_default();
            IdentityError::Api {
                status,
                message: extract_error_message(&body),
            }
        }
    }
}

/// The API gateway answers 401 "Invalid API key" / "No API key found in
/// request" when the anon key itself is wrong, before any token is checked.
fn is_api_key_rejection(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("api key") || message.contains("apikey")
}

/// GoTrue reports errors under a few different keys depending on the endpoint
fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        msg: Option<String>,
        message: Option<String>,
        error_description: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg.or(b.message).or(b.error_description).or(b.error))
        .unwrap_or_else(|| body.to_string())
}

/// Request types for Supabase Auth API
#[derive(Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
    code_challenge: &'a str,
    code_challenge_method: &'a str,
}

#[derive(Serialize)]
struct PkceTokenRequest<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

/// Response types from Supabase Auth API
#[derive(Deserialize)]
struct SupabaseUserResponse {
    id: Uuid,
    email: Option<String>,
}

impl From<SupabaseUserResponse> for AuthUser {
    fn from(r: SupabaseUserResponse) -> Self {
        AuthUser {
            id: UserId(r.id),
            email: r.email,
        }
    }
}

#[derive(Deserialize)]
struct SupabaseSessionResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: SupabaseUserResponse,
}

impl From<SupabaseSessionResponse> for AuthSession {
    fn from(r: SupabaseSessionResponse) -> Self {
        AuthSession {
            access_token: r.access_token,
            refresh_token: r.refresh_token,
            expires_in: r.expires_in,
            user: r.user.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuthClient {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError> {
        let response = self
            .http
            .get(self.auth_url("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // Expired or forged tokens come back as 401/403; a rejected anon key
        // also comes back as 401 but is a configuration error
        if matches!(response.status().as_u16(), 401 | 403) {
            return match error_from_response(response).await {
                IdentityError::Misconfigured(msg) => Err(IdentityError::Misconfigured(msg)),
                _ => Ok(None),
            };
        }

        let user: SupabaseUserResponse = self.handle_response(response).await?;
        Ok(Some(user.into()))
    }

    async fn request_magic_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        let url = format!("{}?redirect_to={}", self.auth_url("/otp"), encode(redirect_to));

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&OtpRequest {
                email,
                create_user: true,
                code_challenge,
                code_challenge_method: "s256",
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError> {
        let response = self
            .http
            .post(self.auth_url("/token?grant_type=pkce"))
            .header("apikey", &self.anon_key)
            .json(&PkceTokenRequest {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await?;

        let session: SupabaseSessionResponse = self.handle_response(response).await?;
        Ok(session.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(self.auth_url("/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
