use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::contact::{Submission, ValidSubmission},
    errors::ContactError,
};

/// `local@domain.tld` with no whitespace and a single `@`.
pub static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

/// Checks that every field is present and the email is well formed.
pub fn validate(submission: Submission) -> Result<ValidSubmission, ContactError> {
    submission.validate()?;

    Ok(ValidSubmission {
        id: Uuid::new_v4(),
        name: submission.name,
        email: submission.email,
        subject: submission.subject,
        message: submission.message,
        client_id: submission.client_id,
    })
}
