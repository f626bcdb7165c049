//! Client configuration.
//!
//! Public endpoints and keys needed to reach the hosted auth and snippet
//! store. The OAuth redirect target is configuration only; the client never
//! derives it from request headers or a baked-in domain.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_AUTH_REDIRECT_URL: &str = "SNIPPETBOX_AUTH_REDIRECT_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Set both SUPABASE_URL and SUPABASE_ANON_KEY, or neither")]
    Partial,
    #[error("{field} must include http:// or https://")]
    InvalidUrl { field: &'static str },
}

/// Hosted backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default)]
    pub auth_redirect_url: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `Ok(None)` when neither URL nor key is set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        parse_config(|key| env::var(key).ok())
    }

    /// `PostgREST` base URL (`<project>/rest/v1`)
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }

    /// `GoTrue` base URL (`<project>/auth/v1`)
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<ClientConfig>, ConfigError> {
    let url = normalize_text_option(lookup(ENV_SUPABASE_URL));
    let anon_key = normalize_text_option(lookup(ENV_SUPABASE_ANON_KEY));
    let redirect = normalize_text_option(lookup(ENV_AUTH_REDIRECT_URL));

    let (url, anon_key) = match (url, anon_key) {
        (None, None) => return Ok(None),
        (Some(url), Some(anon_key)) => (url, anon_key),
        _ => return Err(ConfigError::Partial),
    };

    Ok(Some(ClientConfig {
        supabase_url: normalize_base_url(&url, ENV_SUPABASE_URL)?,
        supabase_anon_key: anon_key,
        auth_redirect_url: redirect
            .map(|redirect| normalize_base_url(&redirect, ENV_AUTH_REDIRECT_URL))
            .transpose()?,
    }))
}

fn normalize_base_url(raw: &str, field: &'static str) -> Result<String, ConfigError> {
    if !is_http_url(raw) {
        return Err(ConfigError::InvalidUrl { field });
    }
    Ok(raw.trim_end_matches('/').to_string())
}
