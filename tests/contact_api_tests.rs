mod test_utils;

use contact_backend::{entities::contact::ContactResponse, settings::AppEnvironment};
use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

#[actix_rt::test]
async fn valid_submission_sends_notification_and_autoresponder() {
    let app = TestApp::spawn().await;

    let response = app.post_contact(&valid_form(), "203.0.113.10").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: ContactResponse = response.json().await.unwrap();
    assert_eq!(body, ContactResponse::sent());

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent.iter().filter(|m| m.to == OPERATOR_INBOX).count(), 1);
    assert_eq!(sent.iter().filter(|m| m.to == "jane@example.com").count(), 1);

    let notification = sent.iter().find(|m| m.to == OPERATOR_INBOX).unwrap();
    assert!(notification.subject.contains("Pricing"));
    assert!(notification.html.contains("203.0.113.10"));

    let reply = sent.iter().find(|m| m.to == "jane@example.com").unwrap();
    assert_eq!(reply.subject, "Thank you for contacting AnantaChakra, Jane Doe!");
}

#[actix_rt::test]
async fn blank_fields_are_rejected_without_sending_mail() {
    let app = TestApp::spawn().await;

    for field in ["name", "email", "subject", "message"] {
        let form: Vec<(&str, &str)> = valid_form()
            .into_iter()
            .map(|(k, v)| if k == field { (k, "   ") } else { (k, v) })
            .collect();

        let response = app.post_contact(&form, "203.0.113.11").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "blank {field}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "All fields are required");
    }

    assert!(app.mailer.sent().is_empty());
    assert_eq!(app.mailer.verify_calls(), 0);
}

#[actix_rt::test]
async fn absent_fields_count_as_missing() {
    let app = TestApp::spawn().await;

    let response = app
        .post_contact(&[("name", "Jane Doe"), ("email", "jane@example.com")], "203.0.113.12")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "All fields are required");
}

#[actix_rt::test]
async fn malformed_email_is_rejected() {
    let app = TestApp::spawn().await;

    let form: Vec<(&str, &str)> = valid_form()
        .into_iter()
        .map(|(k, v)| if k == "email" { (k, "not-an-email") } else { (k, v) })
        .collect();
    let response = app.post_contact(&form, "203.0.113.13").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Please provide a valid email address");
    assert!(app.mailer.sent().is_empty());
}

#[actix_rt::test]
async fn sixth_submission_in_a_minute_is_throttled() {
    let app = TestApp::spawn().await;

    for _ in 0..5 {
        let response = app.post_contact(&valid_form(), "198.51.100.20").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.post_contact(&valid_form(), "198.51.100.20").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Too many requests. Please try again later.");

    assert_eq!(app.mailer.sent().len(), 10);

    // A different client still has its own quota
    let response = app.post_contact(&valid_form(), "198.51.100.21").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn invalid_submissions_do_not_use_up_the_quota() {
    let app = TestApp::spawn().await;
    let invalid = [("name", "Jane"), ("email", "nope"), ("subject", "Hi"), ("message", "Hi")];

    for _ in 0..6 {
        let response = app.post_contact(&invalid, "198.51.100.30").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app.post_contact(&valid_form(), "198.51.100.30").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn unreachable_transport_fails_before_any_send() {
    let app = TestApp::spawn_with(RecordingMailer::unreachable(), test_config()).await;

    let response = app.post_contact(&valid_form(), "203.0.113.14").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email service configuration error");
    assert!(body["details"].as_str().unwrap().contains("connection refused"));
    assert!(app.mailer.sent().is_empty());
}

#[actix_rt::test]
async fn one_failed_send_fails_the_whole_request() {
    let app = TestApp::spawn_with(RecordingMailer::rejecting("jane@example.com"), test_config()).await;

    let response = app.post_contact(&valid_form(), "203.0.113.15").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to send email");
    assert!(body.get("message").is_none());

    // The notification went out, yet the client is told the request failed
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, OPERATOR_INBOX);
}

#[actix_rt::test]
async fn production_hides_error_details() {
    let mut config = test_config();
    config.env = AppEnvironment::Production;
    let app = TestApp::spawn_with(RecordingMailer::unreachable(), config).await;

    let response = app.post_contact(&valid_form(), "203.0.113.16").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Email service configuration error");
    assert!(body.get("details").is_none());
}

#[actix_rt::test]
async fn transport_check_can_be_disabled() {
    let mut config = test_config();
    config.verify_transport = false;
    let app = TestApp::spawn_with(RecordingMailer::unreachable(), config).await;

    let response = app.post_contact(&valid_form(), "203.0.113.17").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mailer.verify_calls(), 0);
    assert_eq!(app.mailer.sent().len(), 2);
}

#[actix_rt::test]
async fn unreadable_payload_is_a_json_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/api/contact", app.address))
        .json(&serde_json::json!({"name": "Jane"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid form submission"));
}

#[actix_rt::test]
async fn multipart_submission_is_accepted() {
    let app = TestApp::spawn().await;

    let response = app.post_contact_multipart(&valid_form(), "203.0.113.19").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: ContactResponse = response.json().await.unwrap();
    assert_eq!(body, ContactResponse::sent());

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent.iter().filter(|m| m.to == OPERATOR_INBOX).count(), 1);
    assert_eq!(sent.iter().filter(|m| m.to == "jane@example.com").count(), 1);
}

#[actix_rt::test]
async fn multipart_missing_field_counts_as_missing() {
    let app = TestApp::spawn().await;

    let form: Vec<(&str, &str)> = valid_form()
        .into_iter()
        .filter(|(k, _)| *k != "message")
        .collect();
    let response = app.post_contact_multipart(&form, "203.0.113.20").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "All fields are required");
    assert!(app.mailer.sent().is_empty());
}

#[actix_rt::test]
async fn malformed_multipart_is_a_json_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/api/contact", app.address))
        .header("Content-Type", "multipart/form-data; boundary=----contactboundary")
        .body("not a multipart body")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(app.mailer.sent().is_empty());
}

#[actix_rt::test]
async fn health_reports_only_its_own_limiter() {
    let busy = TestApp::spawn().await;
    let idle = TestApp::spawn().await;

    busy.post_contact(&valid_form(), "203.0.113.21").await;
    busy.post_contact(&valid_form(), "203.0.113.22").await;

    for (app, expected) in [(&busy, 2), (&idle, 0), (&busy, 2)] {
        let health = app.client.get(format!("{}/health", app.address)).send().await.unwrap();
        let body: Value = health.json().await.unwrap();
        assert_eq!(body["rate_limit"]["tracked_clients"], expected);
    }
}

#[actix_rt::test]
async fn home_and_health_respond() {
    let app = TestApp::spawn().await;
    app.post_contact(&valid_form(), "203.0.113.18").await;

    let home = app.client.get(format!("{}/", app.address)).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    let body: Value = home.json().await.unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let health = app.client.get(format!("{}/health", app.address)).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rate_limit"]["limit"], 5);
    assert_eq!(app.state.limiter.tracked_clients(), 1);
}
