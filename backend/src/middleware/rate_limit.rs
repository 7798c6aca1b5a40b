//! General per-client rate limiting for every route.
//!
//! Clients are keyed by the first `X-Forwarded-For` hop, falling back to the
//! peer address. Rejected requests get a `429` with a short localized notice
//! and never reach the wrapped service.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::WindowRateLimiter;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
/// Key used when neither a forwarded address nor a peer address is known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Body of a general rate-limit rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRejection {
    pub error: String,
    pub message: String,
}

impl Default for RateLimitRejection {
    fn default() -> Self {
        Self {
            error: "Too Many Requests".to_owned(),
            message: "Has excedido el límite de solicitudes permitidas. Intenta nuevamente en un minuto."
                .to_owned(),
        }
    }
}

/// Resolve the limiter key for a request.
pub fn client_key(req: &ServiceRequest) -> String {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());
    if let Some(hop) = forwarded {
        return hop.to_owned();
    }
    req.peer_addr()
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), |addr| addr.ip().to_string())
}

/// Periodically evict windows older than the current one from `limiters`.
///
/// Must be called from within a tokio runtime. Abort the returned handle to
/// stop sweeping.
pub fn spawn_window_sweeper(
    limiters: Vec<Arc<WindowRateLimiter>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            for limiter in &limiters {
                let evicted = limiter.sweep_stale();
                if evicted > 0 {
                    debug!(
                        evicted,
                        remaining = limiter.tracked_keys(),
                        "evicted stale rate-limit windows"
                    );
                }
            }
        }
    })
}

/// Middleware counting every request against a shared [`WindowRateLimiter`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use medibook::domain::{RateLimitPolicy, WindowRateLimiter};
/// use medibook::middleware::RateLimit;
/// use mockable::DefaultClock;
///
/// let policy = RateLimitPolicy::new(300, 60).expect("valid policy");
/// let limiter = Arc::new(WindowRateLimiter::new(policy, Arc::new(DefaultClock)));
/// let app = App::new().wrap(RateLimit::new(limiter));
/// ```
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<WindowRateLimiter>,
}

impl RateLimit {
    /// Wrap `limiter` as middleware.
    pub fn new(limiter: Arc<WindowRateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<WindowRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_key(&req);
        if !self.limiter.try_acquire(&key) {
            warn!(client = %key, path = %req.path(), "general rate limit exceeded");
            let response = HttpResponse::TooManyRequests().json(RateLimitRejection::default());
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
