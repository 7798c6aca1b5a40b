//! Domain primitives, services and ports.
//!
//! Purpose: model turns, family members and request throttling without any
//! knowledge of HTTP or storage. Inbound adapters call the driving ports in
//! [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - [`BookingEngine`]: validates and creates turns.
//! - [`FamilyRegistry`]: owns family members and DNI uniqueness.
//! - [`WindowRateLimiter`]: per-key fixed-window request counter.
//! - [`PartnerLookupGate`]: ordered checks in front of the certificate lookup.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure envelope.

pub mod booking_engine;
pub mod certificate_lookup;
pub mod error;
pub mod family;
pub mod family_registry;
mod identifier;
pub mod partner_lookup;
mod port_errors;
pub mod ports;
pub mod rate_limit;
pub mod trace_id;
pub mod turn;
pub mod user;

pub use self::booking_engine::{BookingEngine, BookingRepositories};
pub use self::certificate_lookup::{CERTIFICATE_VALIDITY_DAYS, CompletedTurnCertificateLookup};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::family::{
    Birthdate, FamilyMember, FamilyMemberDraft, FamilyValidationError, Gender, NAME_MAX, NAME_MIN,
    PersonName, Relationship,
};
pub use self::family_registry::FamilyRegistry;
pub use self::identifier::{FamilyMemberId, TurnId, UserId};
pub use self::partner_lookup::{
    PartnerLookupGate, PartnerLookupRequest, credential_fingerprint, escape_html,
};
pub use self::rate_limit::{RateLimitPolicy, RateLimitPolicyError, WindowRateLimiter};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::turn::{MOTIVE_MAX, Motive, MotiveTooLong, Turn, TurnStatus};
pub use self::user::{DNI_MAX, DNI_MIN, Dni, DniError, UnknownLabel, User, UserRole, UserStatus};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use medibook::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
