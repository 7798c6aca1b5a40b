//! Port answering whether a patient holds a recent health certificate.

use async_trait::async_trait;

use crate::domain::Error;

/// Health-certificate lookup consumed by the partner gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthCertificateLookup: Send + Sync {
    /// Whether the patient registered with `email` has a valid certificate
    /// issued within the last year. Unknown e-mails answer `false`.
    async fn has_certificate_within_last_year(&self, email: &str) -> Result<bool, Error>;
}
