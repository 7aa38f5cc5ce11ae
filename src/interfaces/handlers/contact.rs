use actix_multipart::form::MultipartForm;
use actix_web::{post, web, Either, HttpRequest, HttpResponse, Responder, ResponseError};

use crate::{
    entities::contact::{ContactForm, ContactMultipart},
    routes::form_error::FormError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

/// Accepts the landing-page contact form, urlencoded or multipart, and sends the two emails.
#[post("/contact")]
pub async fn submit_contact(
    request: HttpRequest,
    state: web::Data<AppState>,
    data_input: Result<Either<web::Form<ContactForm>, MultipartForm<ContactMultipart>>, actix_web::Error>,
) -> impl Responder {
    let form = match data_input {
        Ok(Either::Left(form)) => form.into_inner(),
        Ok(Either::Right(upload)) => upload.into_inner().into(),
        Err(e) => {
            tracing::info!("Unreadable contact form: {}", e);
            return FormError::from(e).error_response();
        }
    };

    let client_id = get_client_ip(&request, state.trust_x_forwarded_for);

    match state.contact_handler.submit(form, &client_id).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.to_http_response(state.expose_error_details),
    }
}
