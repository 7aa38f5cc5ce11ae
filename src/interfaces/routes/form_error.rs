use actix_multipart::{form::MultipartFormConfig, MultipartError};
use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::UrlencodedError,
};

use crate::entities::contact::ContactResponse;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _req| {
        FormError::from(err).into()
    }));
    cfg.app_data(MultipartFormConfig::default().error_handler(|err, _req| {
        FormError::from(err).into()
    }));
}

/// Unreadable form payloads, reported in the same JSON shape as other failures
#[derive(Debug, Clone)]
pub struct FormError {
    message: String,
    status: StatusCode
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for FormError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(ContactResponse::failure(&self.message, None))
    }
}

impl From<UrlencodedError> for FormError {
    fn from(err: UrlencodedError) -> Self {
        let status = match err {
            UrlencodedError::Overflow { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };

        FormError {
            message: format!("Invalid form submission: {}", err),
            status,
        }
    }
}

impl From<MultipartError> for FormError {
    fn from(err: MultipartError) -> Self {
        let status = match err.status_code() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };

        FormError {
            message: format!("Invalid form submission: {}", err),
            status,
        }
    }
}

/// Extractor failures that were not already shaped by one of the handlers above
impl From<actix_web::Error> for FormError {
    fn from(err: actix_web::Error) -> Self {
        if let Some(form_error) = err.as_error::<FormError>() {
            return form_error.clone();
        }

        let status = match err.as_response_error().status_code() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };

        FormError {
            message: format!("Invalid form submission: {}", err),
            status,
        }
    }
}
