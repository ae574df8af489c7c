#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use formdesk::config::{Config, OfficePhone, RateLimitConfig, SiteConfig, StateBackend};
use formdesk::db::{Persistence, SubmissionSink};
use formdesk::email::{MailTransport, OutgoingMail};
use formdesk::models::Submission;
use formdesk::state::AppState;
use formdesk::store::MemoryStore;

/// Mail transport that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), String> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail {
            Err("connection refused".to_string())
        } else {
            Ok(())
        }
    }
}

/// Submission sink that keeps every saved submission.
#[derive(Default)]
pub struct RecordingSink {
    pub saved: Mutex<Vec<Submission>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<Submission> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn save(&self, submission: &Submission) -> Result<(), String> {
        if self.fail {
            return Err("relation \"form_submissions\" does not exist".to_string());
        }
        self.saved.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        database_url: None,
        require_database: false,
        max_body_size: 65_536,
        trusted_proxies: vec![],
        allowed_origins: vec![],
        log_level: "warn".to_string(),
        error_log: None,
        state_backend: StateBackend::Memory,
        rate_limit: RateLimitConfig::default(),
        session_ttl_secs: 7200,
        secure_cookies: false,
        honeypot_field: None,
        site: SiteConfig {
            name: "Harbor Care".to_string(),
            admin_email: "info@harborcare.test".to_string(),
            mail_from: "Harbor Care <noreply@harborcare.test>".to_string(),
            office_phones: vec![OfficePhone {
                label: "Main Office".to_string(),
                number: "(443) 249-3285".to_string(),
            }],
        },
        smtp: None,
    }
}

/// A running test server instance with recording side effects.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub mailer: Arc<RecordingMailer>,
    pub sink: Arc<RecordingSink>,
}

pub struct TestAppBuilder {
    config: Config,
    mailer: RecordingMailer,
    sink: RecordingSink,
    persistence_unavailable: bool,
}

impl TestAppBuilder {
    pub fn config(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn failing_mailer(mut self) -> Self {
        self.mailer = RecordingMailer::failing();
        self
    }

    pub fn failing_sink(mut self) -> Self {
        self.sink = RecordingSink::failing();
        self
    }

    pub fn persistence_unavailable(mut self) -> Self {
        self.persistence_unavailable = true;
        self
    }

    pub async fn spawn(self) -> TestApp {
        let mailer = Arc::new(self.mailer);
        let sink = Arc::new(self.sink);

        let persistence = if self.persistence_unavailable {
            Persistence::Unavailable("connection refused".to_string())
        } else {
            Persistence::Enabled(sink.clone())
        };

        let state = AppState::new(
            self.config,
            Arc::new(MemoryStore::new()),
            mailer.clone(),
            persistence,
        );
        let app = formdesk::build_app(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server failed");
        });

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        TestApp {
            addr,
            client,
            mailer,
            sink,
        }
    }
}

pub fn builder() -> TestAppBuilder {
    TestAppBuilder {
        config: test_config(),
        mailer: RecordingMailer::default(),
        sink: RecordingSink::default(),
        persistence_unavailable: false,
    }
}

pub async fn spawn_app() -> TestApp {
    builder().spawn().await
}

/// A browser session: the session cookie plus its anti-forgery token.
pub struct Session {
    pub cookie: String,
    pub token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Fetch a token, starting a new session.
    pub async fn session(&self) -> Session {
        let resp = self
            .client
            .get(self.url("/api/v1/forms/token"))
            .send()
            .await
            .expect("token request failed");
        assert_eq!(resp.status(), StatusCode::OK, "token request non-200");

        let cookie = resp
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("missing session cookie")
            .to_string();
        let body: Value = resp.json().await.unwrap();

        Session {
            cookie,
            token: body["csrf_token"].as_str().unwrap().to_string(),
        }
    }

    /// Submit form-urlencoded data with the session cookie, return (body, status).
    pub async fn submit_form(
        &self,
        session: Option<&Session>,
        data: &[(&str, &str)],
    ) -> (Value, StatusCode) {
        let mut req = self.client.post(self.url("/api/v1/forms")).form(data);
        if let Some(s) = session {
            req = req.header("cookie", &s.cookie);
        }
        let resp = req.send().await.expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit a valid-by-default form of the given kind with overrides applied.
    pub async fn submit_with(
        &self,
        session: &Session,
        base: Vec<(&'static str, &'static str)>,
        overrides: &[(&str, &str)],
    ) -> (Value, StatusCode) {
        let mut data: Vec<(&str, &str)> = vec![("csrf_token", session.token.as_str())];
        for (k, v) in base {
            if !overrides.iter().any(|(ok, _)| *ok == k) {
                data.push((k, v));
            }
        }
        data.extend_from_slice(overrides);
        self.submit_form(Some(session), &data).await
    }
}

pub fn contact_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("form_type", "contact"),
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("email", "ada@example.com"),
        ("phone", "(443) 249-3285"),
        ("message", "I would like to learn more\nabout your services."),
        ("math_answer", "4"),
    ]
}

pub fn complaint_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("form_type", "complaint"),
        ("first_name", "Grace"),
        ("last_name", "Hopper"),
        ("email", "grace@example.com"),
        ("phone", "301-576-0555"),
        ("complaint", "Nobody called me back."),
        ("math_answer", "4"),
    ]
}

pub fn referral_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("form_type", "referral"),
        ("referrer_name", "Dr. Alan Turing"),
        ("organization", "County Health"),
        ("referrer_phone", "410.555.0100"),
        ("referrer_email", "alan@county.example"),
        ("participant_name", "Joan Clarke"),
        ("relationship", "Case manager"),
        ("participant_phone", ""),
        ("participant_email", ""),
        ("address", "12 Bletchley Rd"),
        ("reason", "Needs in-home support"),
        ("services_needed[]", "Personal care"),
        ("services_needed[]", "Respite"),
        ("additional_details", ""),
        ("math_answer", "5"),
    ]
}
