use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, routes};
pub use infrastructure::{limiter, mail, utils};

use limiter::rate_limiter::ContactRateLimiter;
use mail::mailer::Mailer;
use use_cases::contact::{ContactHandler, DispatchSettings};

/// Mail transport shared by every worker
pub type SharedMailer = Arc<dyn Mailer>;

pub type AppContactHandler = ContactHandler<SharedMailer>;

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub limiter: Arc<ContactRateLimiter>,
    pub trust_x_forwarded_for: bool,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, mailer: SharedMailer) -> Self {
        let limiter = Arc::new(ContactRateLimiter::from_config(config));
        let contact_handler = ContactHandler::new(
            mailer,
            limiter.clone(),
            DispatchSettings::from(config),
        );

        AppState {
            contact_handler,
            limiter,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
            expose_error_details: !config.is_production(),
        }
    }
}
