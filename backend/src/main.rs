//! Booking service entry-point: loads settings, wires storage and serves HTTP.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use medibook::config::ServiceSettings;
use medibook::domain::WindowRateLimiter;
use medibook::inbound::http::health::HealthState;
use medibook::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load_from_iter(std::env::args_os()).wrap_err("loading settings")?;
    let clock = Arc::new(DefaultClock);
    let general_limiter = Arc::new(WindowRateLimiter::new(
        settings.general_policy()?,
        clock.clone(),
    ));
    let partner_limiter = Arc::new(WindowRateLimiter::new(settings.partner_policy()?, clock));

    let partner_api_keys = settings.partner_api_keys();
    if partner_api_keys.is_empty() {
        warn!("no partner API keys configured; partner lookups will be rejected");
    }

    let mut config = ServerConfig::new(settings.bind_addr()?, general_limiter, partner_limiter)
        .with_partner_api_keys(partner_api_keys)
        .with_sweep_interval(settings.sweep_interval());
    if let Some(url) = settings.database_url() {
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .wrap_err("connecting to PostgreSQL")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
