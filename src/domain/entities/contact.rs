use actix_multipart::form::{text::Text, MultipartForm};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::EMAIL_PATTERN;

/// Raw contact form as posted by the landing pages.
/// Absent fields deserialize as empty strings and fail validation later.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub message: String,
}

/// The same form sent as `multipart/form-data`, which is what a browser
/// `FormData` body produces.
#[derive(Debug, MultipartForm)]
pub struct ContactMultipart {
    pub name: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub subject: Option<Text<String>>,
    pub message: Option<Text<String>>,
}

impl From<ContactMultipart> for ContactForm {
    fn from(upload: ContactMultipart) -> Self {
        let field = |value: Option<Text<String>>| value.map(Text::into_inner).unwrap_or_default();

        ContactForm {
            name: field(upload.name),
            email: field(upload.email),
            subject: field(upload.subject),
            message: field(upload.message),
        }
    }
}

/// A trimmed submission tied to the client that sent it.
#[derive(Debug, Clone, Validate)]
pub struct Submission {
    #[validate(length(min = 1, code = "required", message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, code = "required", message = "Email is required"),
        regex(path = *EMAIL_PATTERN, code = "invalid_email", message = "Invalid email format")
    )]
    pub email: String,

    #[validate(length(min = 1, code = "required", message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, code = "required", message = "Message is required"))]
    pub message: String,

    pub client_id: String,
}

impl Submission {
    pub fn from_form(form: ContactForm, client_id: impl Into<String>) -> Self {
        Submission {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            client_id: client_id.into(),
        }
    }
}

/// Submission that passed validation. `id` is a reference for logs and the operator email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub client_id: String,
}

/// JSON body returned by the contact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ContactResponse {
    pub fn sent() -> Self {
        ContactResponse {
            success: true,
            message: Some("Email sent successfully".to_string()),
            error: None,
            details: None,
        }
    }

    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        ContactResponse {
            success: false,
            message: None,
            error: Some(error.into()),
            details,
        }
    }
}
