use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use validator::ValidationErrors;

use crate::entities::contact::ContactResponse;

/// Everything that can go wrong while handling a contact submission.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[display("Too many requests. Please try again later.")]
    RateLimitExceeded,

    #[display("All fields are required")]
    MissingFields,

    #[display("Please provide a valid email address")]
    InvalidEmail,

    #[display("Email service configuration error: {_0}")]
    TransportConfig(String),

    #[display("Failed to send email: {_0}")]
    Dispatch(String),
}

impl std::error::Error for ContactError {}

impl ContactError {
    /// Message safe to show to any client.
    pub fn public_message(&self) -> &'static str {
        match self {
            ContactError::RateLimitExceeded => "Too many requests. Please try again later.",
            ContactError::MissingFields => "All fields are required",
            ContactError::InvalidEmail => "Please provide a valid email address",
            ContactError::TransportConfig(_) => "Email service configuration error",
            ContactError::Dispatch(_) => "Failed to send email",
        }
    }

    /// Raw failure detail, only present for server-side errors.
    pub fn details(&self) -> Option<&str> {
        match self {
            ContactError::TransportConfig(detail) | ContactError::Dispatch(detail) => Some(detail),
            _ => None,
        }
    }

    /// Builds the JSON error body. `expose_details` is only set outside production.
    pub fn to_http_response(&self, expose_details: bool) -> HttpResponse {
        let details = if expose_details {
            self.details().map(str::to_string)
        } else {
            None
        };

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ContactResponse::failure(self.public_message(), details))
    }
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response(false)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ContactError::MissingFields => StatusCode::BAD_REQUEST,
            ContactError::InvalidEmail => StatusCode::BAD_REQUEST,
            ContactError::TransportConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An empty field wins over a malformed email.
impl From<ValidationErrors> for ContactError {
    fn from(errors: ValidationErrors) -> Self {
        let missing = errors
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .any(|e| e.code == "required");

        if missing {
            ContactError::MissingFields
        } else {
            ContactError::InvalidEmail
        }
    }
}
