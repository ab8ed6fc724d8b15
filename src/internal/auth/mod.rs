// src/internal/auth/mod.rs

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use tracing::{debug, info};

use crate::internal::config::config::EndpointConfig;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Header names a caller can never set on an upstream request.
pub const RESERVED_HEADERS: [&str; 2] = [API_KEY_HEADER, "authorization"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_HEADERS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Supplies the credential headers merged into every upstream request
#[derive(Debug, Clone, Default)]
pub struct AuthInjector {
    headers: HeaderMap,
}

impl AuthInjector {
    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(api_key) = config.api_key() {
            let mut value =
                HeaderValue::from_str(api_key).context("API key is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        if let Some(token) = config.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Bearer token is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        match headers.len() {
            0 => info!("No upstream credentials configured"),
            n => debug!("Configured {} upstream credential header(s)", n),
        }

        Ok(Self { headers })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
