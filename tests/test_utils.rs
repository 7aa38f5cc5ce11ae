use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use contact_backend::{
    mail::{MailError, Mailer, OutgoingEmail},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment, SmtpSecurity},
    AppState,
};
use parking_lot::Mutex;
use reqwest::{multipart, Client};
use std::{
    net::TcpListener,
    sync::Arc,
    time::Duration,
};

pub const OPERATOR_INBOX: &str = "ops@anantachakra.tech";

/// In-memory transport that records every accepted message.
#[derive(Default)]
pub struct RecordingMailer {
    pub fail_verify: bool,
    pub reject_recipient: Option<String>,
    pub verify_calls: Mutex<usize>,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    #[allow(dead_code)]
    pub fn unreachable() -> Self {
        RecordingMailer {
            fail_verify: true,
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn rejecting(recipient: &str) -> Self {
        RecordingMailer {
            reject_recipient: Some(recipient.to_string()),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }

    #[allow(dead_code)]
    pub fn verify_calls(&self) -> usize {
        *self.verify_calls.lock()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn verify(&self) -> Result<(), MailError> {
        *self.verify_calls.lock() += 1;
        if self.fail_verify {
            return Err(MailError::Unreachable("smtp.test:465: connection refused".into()));
        }
        Ok(())
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.reject_recipient.as_deref() == Some(email.to.as_str()) {
            return Err(MailError::Smtp("550 mailbox unavailable".into()));
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mailer: Arc<RecordingMailer>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(RecordingMailer::default(), test_config()).await
    }

    pub async fn spawn_with(mailer: RecordingMailer, config: AppConfig) -> Self {
        let mailer = Arc::new(mailer);
        let state = web::Data::new(AppState::new(&config, mailer.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            mailer,
            state,
        }
    }

    pub async fn post_contact(&self, form: &[(&str, &str)], client_ip: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/contact", self.address))
            .header("X-Forwarded-For", client_ip)
            .form(form)
            .send()
            .await
            .expect("Failed to submit contact form")
    }

    /// Posts the fields as `multipart/form-data`, the way a browser sends `FormData`.
    #[allow(dead_code)]
    pub async fn post_contact_multipart(&self, form: &[(&str, &str)], client_ip: &str) -> reqwest::Response {
        let body = form
            .iter()
            .fold(multipart::Form::new(), |body, (name, value)| {
                body.text(name.to_string(), value.to_string())
            });

        self.client
            .post(format!("{}/api/contact", self.address))
            .header("X-Forwarded-For", client_ip)
            .multipart(body)
            .send()
            .await
            .expect("Failed to submit multipart contact form")
    }
}

pub fn valid_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("subject", "Pricing"),
        ("message", "How much for SEO?"),
    ]
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Contact API Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        trust_x_forwarded_for: true,
        smtp_host: "smtp.test".to_string(),
        smtp_port: 465,
        smtp_security: SmtpSecurity::Tls,
        smtp_username: "support@anantachakra.tech".to_string(),
        smtp_password: "test-app-password".to_string(),
        mail_from: String::new(),
        operator_inbox: OPERATOR_INBOX.to_string(),
        verify_transport: true,
        rate_limit_max: 5,
        rate_limit_window_secs: 60,
        rate_limit_max_clients: 1_000,
        message_preview_chars: 500,
        display_timezone: "Asia/Kolkata".to_string(),
        brand_name: "AnantaChakra".to_string(),
        brand_website: "https://anantachakra.tech".to_string(),
        brand_tagline: "Let's Evolve & Revolve".to_string(),
    }
}
