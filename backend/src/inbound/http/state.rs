//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::PartnerLookupGate;
use crate::domain::ports::{FamilyMembersCommand, FamilyMembersQuery, TurnBookingCommand};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub bookings: Arc<dyn TurnBookingCommand>,
    pub family: Arc<dyn FamilyMembersCommand>,
    pub family_query: Arc<dyn FamilyMembersQuery>,
    pub partner_gate: Arc<PartnerLookupGate>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub bookings: Arc<dyn TurnBookingCommand>,
    pub family: Arc<dyn FamilyMembersCommand>,
    pub family_query: Arc<dyn FamilyMembersQuery>,
    pub partner_gate: Arc<PartnerLookupGate>,
    /// Source of "today" for birthdate validation.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from a ports bundle and a clock.
    pub fn new(ports: HttpStatePorts, clock: Arc<dyn Clock>) -> Self {
        let HttpStatePorts {
            bookings,
            family,
            family_query,
            partner_gate,
        } = ports;
        Self {
            bookings,
            family,
            family_query,
            partner_gate,
            clock,
        }
    }
}
