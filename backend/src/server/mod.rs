//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{CoreDependencies, build_diesel_http_state, build_memory_http_state};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(debug_assertions)]
use medibook::doc::ApiDoc;
use medibook::domain::WindowRateLimiter;
use medibook::inbound::http::health::HealthState;
use medibook::inbound::http::state::HttpState;
use medibook::inbound::http::{configure, json_config};
use medibook::middleware::spawn_window_sweeper;
use medibook::outbound::memory::InMemoryStore;
use medibook::{RateLimit, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    general_limiter: Arc<WindowRateLimiter>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        general_limiter,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.wrap(RateLimit::new(general_limiter)).wrap(Trace)
}

fn build_state(config: &ServerConfig, clock: Arc<dyn Clock>) -> web::Data<HttpState> {
    let deps = CoreDependencies {
        clock,
        partner_limiter: config.partner_limiter.clone(),
        partner_api_keys: config.partner_api_keys.clone(),
    };
    if let Some(pool) = &config.db_pool {
        info!("using PostgreSQL repositories");
        build_diesel_http_state(pool, deps)
    } else {
        warn!("no database configured; bookings are kept in memory");
        build_memory_http_state(&InMemoryStore::new(), deps)
    }
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Also starts the background sweeper that evicts stale rate-limit windows,
/// so it must run inside a tokio runtime.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_state(&config, Arc::new(DefaultClock));
    let ServerConfig {
        bind_addr,
        db_pool: _,
        general_limiter,
        partner_limiter,
        partner_api_keys: _,
        sweep_interval,
    } = config;

    spawn_window_sweeper(
        vec![general_limiter.clone(), partner_limiter],
        sweep_interval,
    );

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            general_limiter: general_limiter.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    info!(%bind_addr, "listening");
    Ok(server)
}
