use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use chrono::Utc;
use std::{
    time::Duration,
    sync::atomic::{AtomicI64, Ordering},
};
use serde::Serialize;

use crate::{constants::START_TIME, limiter::rate_limiter::ContactRateLimiter, AppState};

#[derive(Serialize, Clone, Default)]
struct RateLimitInfo {
    tracked_clients: usize,
    limit: usize,
    window: String,
}

/// Process-wide part of the health body.
#[derive(Serialize, Clone, Default)]
struct ServerStatus {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: String,
}

#[derive(Serialize)]
struct HealthCheckResponse {
    #[serde(flatten)]
    server: ServerStatus,
    rate_limit: RateLimitInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<ServerStatus>> = Lazy::new(||
    RwLock::new(ServerStatus::default())
);

fn build_server_status() -> ServerStatus {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0);
    let human_uptime = format_duration(Duration::from_secs(uptime_secs as u64));

    ServerStatus {
        status: "healthy".to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Server status, rebuilt at most every five seconds.
fn server_status() -> ServerStatus {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > 5 {
        let status = build_server_status();
        *CACHED_STATUS.write() = status.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);
        status
    } else {
        CACHED_STATUS.read().clone()
    }
}

fn rate_limit_info(limiter: &ContactRateLimiter) -> RateLimitInfo {
    RateLimitInfo {
        tracked_clients: limiter.tracked_clients(),
        limit: limiter.limit(),
        window: format_duration(limiter.window()).to_string(),
    }
}

/// Liveness check. Limiter stats belong to the serving app and are never cached.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthCheckResponse {
        server: server_status(),
        rate_limit: rate_limit_info(&state.limiter),
    })
}
