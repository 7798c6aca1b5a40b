//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockFamilyMembersCommand, MockFamilyMembersQuery, MockHealthCertificateLookup,
    MockTurnBookingCommand,
};
use crate::domain::{PartnerLookupGate, RateLimitPolicy, WindowRateLimiter};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::{MutableClock, instant};

/// Instant every handler test runs at.
pub const NOW: &str = "2025-05-01T12:00:00Z";
/// Partner key accepted by [`http_state`].
pub const PARTNER_KEY: &str = "partner-key-1";

/// Mocks backing an [`HttpState`]. Unused mocks carry no expectations and
/// fail the test if a handler calls them.
pub struct TestPorts {
    pub bookings: MockTurnBookingCommand,
    pub family: MockFamilyMembersCommand,
    pub family_query: MockFamilyMembersQuery,
    pub lookup: MockHealthCertificateLookup,
    pub partner_limit: u32,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            bookings: MockTurnBookingCommand::new(),
            family: MockFamilyMembersCommand::new(),
            family_query: MockFamilyMembersQuery::new(),
            lookup: MockHealthCertificateLookup::new(),
            partner_limit: 10,
        }
    }
}

/// Build handler state from mocks, with the clock pinned at [`NOW`].
pub fn http_state(ports: TestPorts) -> web::Data<HttpState> {
    let clock = Arc::new(MutableClock::new(instant(NOW)));
    let policy = RateLimitPolicy::new(ports.partner_limit, 60)
        .unwrap_or_else(|error| panic!("partner policy: {error}"));
    let limiter = Arc::new(WindowRateLimiter::new(policy, clock.clone()));
    let partner_gate = Arc::new(PartnerLookupGate::new(
        [PARTNER_KEY.to_owned()],
        limiter,
        Arc::new(ports.lookup),
    ));
    web::Data::new(HttpState::new(
        HttpStatePorts {
            bookings: Arc::new(ports.bookings),
            family: Arc::new(ports.family),
            family_query: Arc::new(ports.family_query),
            partner_gate,
        },
        clock,
    ))
}
