use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use futures::future::join;

use crate::{
    entities::contact::{ContactForm, ContactResponse, Submission, ValidSubmission},
    errors::ContactError,
    limiter::rate_limiter::ContactRateLimiter,
    mail::{
        templates::{autoresponder_email, notification_email},
        Branding, Mailer,
    },
    settings::AppConfig,
    validation::validate,
};

/// Everything the dispatcher needs besides the transport itself.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub operator_inbox: String,
    pub branding: Branding,
    pub timezone: Tz,
    pub preview_chars: usize,
    pub verify_transport: bool,
}

impl From<&AppConfig> for DispatchSettings {
    fn from(config: &AppConfig) -> Self {
        DispatchSettings {
            operator_inbox: config.operator_inbox.clone(),
            branding: Branding {
                name: config.brand_name.clone(),
                website: config.brand_website.clone(),
                tagline: config.brand_tagline.clone(),
                support_email: config.sender_address().to_string(),
            },
            timezone: config.timezone(),
            preview_chars: config.message_preview_chars,
            verify_transport: config.verify_transport,
        }
    }
}

pub struct ContactHandler<M>
where
    M: Mailer,
{
    pub mailer: M,
    pub limiter: Arc<ContactRateLimiter>,
    pub settings: DispatchSettings,
}

impl<M> ContactHandler<M>
where
    M: Mailer,
{
    pub fn new(mailer: M, limiter: Arc<ContactRateLimiter>, settings: DispatchSettings) -> Self {
        ContactHandler {
            mailer,
            limiter,
            settings,
        }
    }

    /// Validates the form, charges the client's quota and sends both emails.
    pub async fn submit(
        &self,
        form: ContactForm,
        client_id: &str,
    ) -> Result<ContactResponse, ContactError> {
        let submission = validate(Submission::from_form(form, client_id)).map_err(|e| {
            tracing::info!(client = %client_id, "Rejected contact submission: {}", e);
            e
        })?;

        if !self.limiter.allow(&submission.client_id) {
            tracing::warn!(client = %client_id, "Contact rate limit exceeded");
            return Err(ContactError::RateLimitExceeded);
        }

        self.dispatch(&submission).await?;

        tracing::info!(
            reference = %submission.id,
            client = %client_id,
            "Contact submission delivered"
        );
        Ok(ContactResponse::sent())
    }

    /// Sends the operator notification and the autoresponder.
    ///
    /// Both sends run concurrently and are awaited to completion; the
    /// dispatch only succeeds when both were accepted.
    pub async fn dispatch(&self, submission: &ValidSubmission) -> Result<(), ContactError> {
        if self.settings.verify_transport {
            self.mailer.verify().await.map_err(|e| {
                tracing::error!(reference = %submission.id, "SMTP verify error: {}", e);
                ContactError::TransportConfig(e.to_string())
            })?;
        }

        let submitted_at = Utc::now().with_timezone(&self.settings.timezone);
        let notification = notification_email(
            submission,
            &self.settings.branding,
            &self.settings.operator_inbox,
            &submitted_at,
        );
        let autoresponder = autoresponder_email(
            submission,
            &self.settings.branding,
            self.settings.preview_chars,
        );

        let (notified, acknowledged) = join(
            self.mailer.send(&notification),
            self.mailer.send(&autoresponder),
        )
        .await;

        let failures: Vec<String> = [("notification", notified), ("autoresponder", acknowledged)]
            .into_iter()
            .filter_map(|(kind, outcome)| {
                outcome.err().map(|e| {
                    tracing::error!(reference = %submission.id, "Failed to send {}: {}", kind, e);
                    format!("{kind}: {e}")
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ContactError::Dispatch(failures.join("; ")))
        }
    }
}
