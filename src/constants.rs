use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Submissions allowed per client inside one window
pub const DEFAULT_RATE_LIMIT_MAX: usize = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
/// Upper bound on clients tracked by the limiter at once
pub const DEFAULT_RATE_LIMIT_MAX_CLIENTS: usize = 10_000;

/// Characters of the original message echoed back in the autoresponder
pub const DEFAULT_MESSAGE_PREVIEW_CHARS: usize = 500;

/// Rate-limit key used when the request carries no usable source address
pub const UNKNOWN_CLIENT: &str = "unknown";
