//! Partner-facing health-certificate gate.
//!
//! Partners call a single lookup endpoint with a bearer API key. Checks run
//! in a fixed order and the first failure wins: content type, credential
//! shape, credential allow-list, per-credential rate limit, then e-mail
//! format. The lookup itself only runs once every check has passed.
//!
//! Raw credentials never reach the logs; a truncated SHA-256 fingerprint is
//! logged instead. E-mail values are HTML-escaped before they appear in any
//! diagnostic.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::domain::ports::HealthCertificateLookup;
use crate::domain::{Error, WindowRateLimiter};

const BEARER_PREFIX: &str = "Bearer ";
const FINGERPRINT_BYTES: usize = 8;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Escape HTML metacharacters so untrusted input is inert in diagnostics.
///
/// # Examples
/// ```
/// use medibook::domain::escape_html;
///
/// assert_eq!(escape_html("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
/// ```
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Truncated SHA-256 fingerprint of a partner credential, as 16 hex digits.
#[must_use]
pub fn credential_fingerprint(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
}

/// Raw inputs of a partner lookup, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerLookupRequest {
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// `Authorization` header value.
    pub authorization: Option<String>,
    /// `email` field of the body, if the body carried one.
    pub email: Option<String>,
}

/// Gate in front of [`HealthCertificateLookup`] for partner traffic.
pub struct PartnerLookupGate {
    api_keys: Vec<String>,
    limiter: Arc<WindowRateLimiter>,
    lookup: Arc<dyn HealthCertificateLookup>,
}

impl PartnerLookupGate {
    /// Build a gate. Keys are trimmed and blank entries dropped.
    pub fn new(
        api_keys: impl IntoIterator<Item = String>,
        limiter: Arc<WindowRateLimiter>,
        lookup: Arc<dyn HealthCertificateLookup>,
    ) -> Self {
        let api_keys = api_keys
            .into_iter()
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .collect();
        Self {
            api_keys,
            limiter,
            lookup,
        }
    }

    /// Limiter counting partner requests per credential.
    #[must_use]
    pub fn limiter(&self) -> &Arc<WindowRateLimiter> {
        &self.limiter
    }

    /// Run every check and, if all pass, the lookup.
    ///
    /// # Errors
    ///
    /// - `invalid_request` (`unsupported_content_type`) when the body is not
    ///   declared as JSON.
    /// - `unauthorized` (`missing_credential` or `invalid_credential`).
    /// - `too_many_requests` when the credential's window is exhausted.
    /// - `invalid_request` (`invalid_email`) for a malformed e-mail.
    /// - `internal_error` when the lookup fails.
    pub async fn check(&self, request: PartnerLookupRequest) -> Result<bool, Error> {
        let declares_json = request
            .content_type
            .as_deref()
            .is_some_and(|value| value.contains("application/json"));
        if !declares_json {
            return Err(Error::invalid_request("Content-Type must be application/json")
                .with_details(json!({ "code": "unsupported_content_type" })));
        }

        let Some(raw_key) = request
            .authorization
            .as_deref()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        else {
            return Err(Error::unauthorized("Authorization header must start with Bearer")
                .with_details(json!({ "code": "missing_credential" })));
        };
        let key = raw_key.trim();
        let fingerprint = credential_fingerprint(key);

        if !self.api_keys.iter().any(|allowed| allowed == key) {
            warn!(credential = %fingerprint, "partner lookup with unknown credential");
            return Err(Error::unauthorized("Invalid API Key")
                .with_details(json!({ "code": "invalid_credential" })));
        }

        if !self.limiter.try_acquire(key) {
            warn!(credential = %fingerprint, "partner rate limit exceeded");
            return Err(Error::too_many_requests("Rate limit exceeded"));
        }

        let email = request
            .email
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if !email_regex().is_match(&email) {
            let shown = escape_html(&email);
            warn!(credential = %fingerprint, email = %shown, "partner lookup with invalid email");
            return Err(Error::invalid_request("Invalid email format").with_details(json!({
                "field": "email",
                "code": "invalid_email",
                "value": shown,
            })));
        }

        match self.lookup.has_certificate_within_last_year(&email).await {
            Ok(found) => {
                info!(credential = %fingerprint, found, "partner certificate lookup served");
                Ok(found)
            }
            Err(err) => {
                error!(
                    credential = %fingerprint,
                    email = %escape_html(&email),
                    error = %err,
                    "health certificate lookup failed",
                );
                Err(Error::internal(
                    "An error occurred while processing the request",
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "partner_lookup_tests.rs"]
mod tests;
