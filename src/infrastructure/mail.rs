//! Outbound mail: the transport seam, the SMTP relay behind it, and the
//! two message templates sent for every contact submission.

pub mod mailer;
pub mod message;
pub mod templates;

pub use mailer::{MailError, Mailer, SmtpMailer};
pub use message::OutgoingEmail;
pub use templates::Branding;
