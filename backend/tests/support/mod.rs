//! Shared harness for HTTP integration tests.
//!
//! Apps run over the in-memory store with a controllable clock, wired by the
//! same builders the server binary uses.

use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use medibook::domain::{
    Dni, RateLimitPolicy, User, UserId, UserRole, UserStatus, WindowRateLimiter,
};
use medibook::inbound::http::health::HealthState;
use medibook::inbound::http::{configure, json_config};
use medibook::outbound::memory::InMemoryStore;
use medibook::{RateLimit, Trace};

#[expect(
    dead_code,
    reason = "state builder include exposes the Diesel wiring unused by in-memory tests"
)]
#[path = "../../src/server/state_builders.rs"]
mod state_builders;

use state_builders::{CoreDependencies, build_memory_http_state};

pub const NOW: &str = "2025-05-01T12:00:00Z";
pub const PARTNER_KEY: &str = "partner-key-1";

/// Clock frozen until a test moves it.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn at(raw: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(instant(raw))))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.0.lock().expect("clock lock") += TimeDelta::seconds(seconds);
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

pub fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("fixture instant")
        .with_timezone(&Utc)
}

pub fn account(role: UserRole, dni: i64, email: &str) -> User {
    User {
        id: UserId::random(),
        dni: Dni::new(dni).expect("fixture dni"),
        email: email.to_owned(),
        display_name: format!("User {dni}"),
        role,
        status: UserStatus::Active,
    }
}

/// Limits applied by [`TestApp::new`].
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub general: u32,
    pub partner: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            general: 300,
            partner: 10,
        }
    }
}

/// Store, clock and limiters behind an assembled app.
pub struct TestApp {
    pub store: InMemoryStore,
    pub clock: Arc<TestClock>,
    general_limiter: Arc<WindowRateLimiter>,
    partner_limiter: Arc<WindowRateLimiter>,
}

impl TestApp {
    pub fn new(limits: Limits) -> Self {
        let clock = TestClock::at(NOW);
        let limiter = |limit| {
            let policy = RateLimitPolicy::new(limit, 60).expect("valid policy");
            Arc::new(WindowRateLimiter::new(policy, clock.clone()))
        };
        Self {
            store: InMemoryStore::new(),
            general_limiter: limiter(limits.general),
            partner_limiter: limiter(limits.partner),
            clock,
        }
    }

    /// Owned handles for [`build_app`].
    pub fn wiring(&self) -> Wiring {
        Wiring {
            store: self.store.clone(),
            clock: self.clock.clone(),
            general_limiter: self.general_limiter.clone(),
            partner_limiter: self.partner_limiter.clone(),
        }
    }
}

/// Everything [`build_app`] needs, detached from the harness borrow.
pub struct Wiring {
    store: InMemoryStore,
    clock: Arc<TestClock>,
    general_limiter: Arc<WindowRateLimiter>,
    partner_limiter: Arc<WindowRateLimiter>,
}

/// App wired the way the server binary wires it.
pub fn build_app(
    wiring: Wiring,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let Wiring {
        store,
        clock,
        general_limiter,
        partner_limiter,
    } = wiring;
    let http_state = build_memory_http_state(
        &store,
        CoreDependencies {
            clock,
            partner_limiter,
            partner_api_keys: vec![PARTNER_KEY.to_owned()],
        },
    );
    App::new()
        .app_data(web::Data::new(HealthState::new()))
        .app_data(http_state)
        .app_data(json_config())
        .configure(configure)
        .wrap(RateLimit::new(general_limiter))
        .wrap(Trace)
}
