use std::env;

use anyhow::Context;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Supabase project URL, `None` when identity is not configured
    pub supabase_url: Option<String>,
    /// Supabase anon (public) API key
    pub supabase_anon_key: Option<String>,
    /// Base URL for the API (magic links redirect to `{api_base_url}/auth/callback`)
    pub api_base_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            supabase_url: non_placeholder(env::var("SUPABASE_URL").ok()),
            supabase_anon_key: non_placeholder(env::var("SUPABASE_ANON_KEY").ok()),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Check if the identity service is configured
    pub fn identity_enabled(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }

    /// Where magic links send the user back to
    pub fn auth_redirect_url(&self) -> String {
        format!("{}/auth/callback", self.api_base_url.trim_end_matches('/'))
    }
}

/// Treat empty values and a literal "undefined" (left behind by some
/// deploy tooling) as missing.
fn non_placeholder(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "undefined")
}
