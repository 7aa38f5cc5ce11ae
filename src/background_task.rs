use std::{sync::Arc, time::Instant};
use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::ContactRateLimiter;

/// Periodically forgets clients with no submissions left in the window.
pub async fn start_sweep_task(limiter: Arc<ContactRateLimiter>, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let removed = limiter.sweep(Instant::now());
        if removed > 0 {
            tracing::debug!(
                "Swept {} idle rate-limit entries, {} still tracked",
                removed,
                limiter.tracked_clients()
            );
        }
    }
}
