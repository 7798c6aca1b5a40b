//! Builders wiring repositories into domain services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use medibook::domain::ports::{FamilyMemberRepository, TurnRepository, UserRepository};
use medibook::domain::{
    BookingEngine, BookingRepositories, CompletedTurnCertificateLookup, FamilyRegistry,
    PartnerLookupGate, WindowRateLimiter,
};
use medibook::inbound::http::state::{HttpState, HttpStatePorts};
use medibook::outbound::memory::InMemoryStore;
use medibook::outbound::notifications::{TracingBadgeEvaluationTrigger, TracingBookingNotifier};
use medibook::outbound::persistence::{
    DbPool, DieselFamilyMemberRepository, DieselTurnRepository, DieselUserRepository,
};

/// Collaborators shared by every repository flavour.
pub struct CoreDependencies {
    pub clock: Arc<dyn Clock>,
    pub partner_limiter: Arc<WindowRateLimiter>,
    pub partner_api_keys: Vec<String>,
}

/// Build HTTP state from any set of repository adapters.
pub fn build_http_state<U, F, T>(
    users: Arc<U>,
    members: Arc<F>,
    turns: Arc<T>,
    deps: CoreDependencies,
) -> web::Data<HttpState>
where
    U: UserRepository + 'static,
    F: FamilyMemberRepository + 'static,
    T: TurnRepository + 'static,
{
    let CoreDependencies {
        clock,
        partner_limiter,
        partner_api_keys,
    } = deps;

    let registry = Arc::new(FamilyRegistry::new(users.clone(), members.clone()));
    let engine = BookingEngine::new(
        BookingRepositories {
            users: users.clone(),
            members,
            turns: turns.clone(),
        },
        Arc::new(TracingBookingNotifier),
        Arc::new(TracingBadgeEvaluationTrigger),
        clock.clone(),
    );
    let lookup = CompletedTurnCertificateLookup::new(users, turns, clock.clone());
    let partner_gate = PartnerLookupGate::new(partner_api_keys, partner_limiter, Arc::new(lookup));

    web::Data::new(HttpState::new(
        HttpStatePorts {
            bookings: Arc::new(engine),
            family: registry.clone(),
            family_query: registry,
            partner_gate: Arc::new(partner_gate),
        },
        clock,
    ))
}

/// HTTP state over the in-memory store.
pub fn build_memory_http_state(
    store: &InMemoryStore,
    deps: CoreDependencies,
) -> web::Data<HttpState> {
    let store = Arc::new(store.clone());
    build_http_state(store.clone(), store.clone(), store, deps)
}

/// HTTP state over PostgreSQL.
pub fn build_diesel_http_state(pool: &DbPool, deps: CoreDependencies) -> web::Data<HttpState> {
    build_http_state(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselFamilyMemberRepository::new(pool.clone())),
        Arc::new(DieselTurnRepository::new(pool.clone())),
        deps,
    )
}
