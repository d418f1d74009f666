//! The email waitlist form.
//!
//! Local validation and debouncing first; only a well-formed email that
//! clears the spacing guard reaches the network. The POST itself runs on a
//! worker thread behind [`WaitlistTransport`] and its reply returns over a
//! channel, so the tick domain never blocks on the wire. No retries are
//! automatic; the user resubmits.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stardust_core::{Countdown, WaitlistConfig};

/// Local validation pattern: something, an `@`, a domain with a TLD.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Reply message shown on duplicate submissions, keyed off the backend's
/// error classification.
const DUPLICATE_ERROR: &str = "Email already exists";

/// Errors building the form or its transport.
#[derive(Error, Debug)]
pub enum WaitlistError {
    /// The validation pattern failed to compile.
    #[error("email pattern invalid: {0}")]
    Pattern(#[from] regex::Error),

    /// The HTTP client could not be constructed.
    #[error("transport construction failed: {0}")]
    Client(String),
}

/// What the worker thread reports back.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The request never completed.
    #[error("request failed: {0}")]
    Request(String),

    /// The reply body was not the expected JSON shape.
    #[error("malformed reply: {0}")]
    Body(String),
}

/// The form-encoded submission body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// The validated email address.
    pub email: String,
    /// Client-side timestamp, ISO 8601.
    pub client_timestamp: String,
    /// Browser user agent string.
    pub user_agent: String,
    /// Referrer URL, possibly empty.
    pub referrer: String,
    /// URL of the submitting page.
    pub page_url: String,
    /// Honeypot field; non-empty means a bot filled the hidden input.
    #[serde(rename = "hpField")]
    pub honeypot: String,
}

/// Request metadata collected at submit time.
#[derive(Debug, Clone, Default)]
pub struct SubmissionMeta {
    /// Client-side timestamp, ISO 8601.
    pub client_timestamp: String,
    /// Browser user agent string.
    pub user_agent: String,
    /// Referrer URL.
    pub referrer: String,
    /// URL of the submitting page.
    pub page_url: String,
    /// Honeypot field value.
    pub honeypot: String,
}

/// The backend's JSON reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaitlistResponse {
    /// Whether the email was recorded.
    #[serde(default)]
    pub success: bool,
    /// Error classification on failure.
    #[serde(default)]
    pub error: Option<String>,
}

/// Capability boundary to the waitlist endpoint. Implementations run on a
/// worker thread and must not assume a tick context.
#[cfg_attr(test, mockall::automock)]
pub trait WaitlistTransport: Send + Sync {
    /// Posts one submission and parses the JSON reply.
    fn submit(
        &self,
        endpoint: &str,
        submission: &Submission,
    ) -> Result<WaitlistResponse, TransportError>;
}

/// The production transport: a blocking HTTP client with form encoding.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds the client once; reused across submissions.
    pub fn new() -> Result<Self, WaitlistError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| WaitlistError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl WaitlistTransport for HttpTransport {
    fn submit(
        &self,
        endpoint: &str,
        submission: &Submission,
    ) -> Result<WaitlistResponse, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .form(submission)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        response
            .json::<WaitlistResponse>()
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

/// Immediate result of a submit attempt, before any network reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Dispatched to the worker thread.
    Accepted,
    /// A request is already in flight.
    BlockedInFlight,
    /// Too soon after the previous submission.
    BlockedDebounce,
    /// Failed local validation; never reaches the network.
    InvalidEmail,
    /// The form element is missing; the feature is disabled.
    Degraded,
}

/// User-visible state of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitlistStatus {
    /// Nothing pending, nothing shown.
    Idle,
    /// A request is in flight; inputs are disabled.
    Loading,
    /// The email was recorded; the success modal is up.
    Joined,
    /// The email was already on the list; the friendlier message is up.
    AlreadyJoined,
    /// Validation or network failure message.
    Failed {
        /// The message shown inline.
        message: String,
    },
}

/// The form handler.
pub struct WaitlistForm {
    config: WaitlistConfig,
    email_pattern: Regex,
    transport: Arc<dyn WaitlistTransport>,
    tx: Sender<Result<WaitlistResponse, TransportError>>,
    rx: Receiver<Result<WaitlistResponse, TransportError>>,
    present: bool,
    in_flight: bool,
    last_submission: Option<f64>,
    status: WaitlistStatus,
    auto_hide: Countdown,
}

impl WaitlistForm {
    /// Builds the handler. `present` reflects whether the form and its
    /// input exist on the page; when false every submit degrades to a
    /// logged no-op.
    pub fn new(
        config: WaitlistConfig,
        transport: Arc<dyn WaitlistTransport>,
        present: bool,
    ) -> Result<Self, WaitlistError> {
        if !present {
            tracing::warn!("waitlist form missing; submissions disabled");
        }
        let (tx, rx) = crossbeam_channel::unbounded();
        Ok(Self {
            config,
            email_pattern: Regex::new(EMAIL_PATTERN)?,
            transport,
            tx,
            rx,
            present,
            in_flight: false,
            last_submission: None,
            status: WaitlistStatus::Idle,
            auto_hide: Countdown::new(),
        })
    }

    /// Current user-visible state.
    #[must_use]
    pub fn status(&self) -> &WaitlistStatus {
        &self.status
    }

    /// Local email validation; no network involved.
    #[must_use]
    pub fn is_valid_email(&self, email: &str) -> bool {
        !email.is_empty() && self.email_pattern.is_match(email)
    }

    /// Attempts a submission.
    ///
    /// Guard order matches the page: presence, in-flight, debounce, then
    /// validation. The debounce clock advances on any attempt that clears
    /// the spacing guard, valid or not.
    pub fn submit(&mut self, now: f64, email: &str, meta: SubmissionMeta) -> SubmitOutcome {
        if !self.present {
            return SubmitOutcome::Degraded;
        }
        if self.in_flight {
            tracing::debug!("submission blocked: already submitting");
            return SubmitOutcome::BlockedInFlight;
        }
        if let Some(last) = self.last_submission {
            if now - last < self.config.debounce {
                tracing::debug!("submission blocked: too soon after last submission");
                return SubmitOutcome::BlockedDebounce;
            }
        }
        self.last_submission = Some(now);

        let email = email.trim();
        if !self.is_valid_email(email) {
            self.show_failure("Please enter a valid email address", now);
            return SubmitOutcome::InvalidEmail;
        }

        self.in_flight = true;
        self.status = WaitlistStatus::Loading;
        self.auto_hide.cancel();

        let submission = Submission {
            email: email.to_string(),
            client_timestamp: meta.client_timestamp,
            user_agent: meta.user_agent,
            referrer: meta.referrer,
            page_url: meta.page_url,
            honeypot: meta.honeypot,
        };
        let transport = Arc::clone(&self.transport);
        let endpoint = self.config.endpoint.clone();
        let tx = self.tx.clone();
        // Detached on purpose: the reply comes back over the channel.
        let _ = thread::spawn(move || {
            let result = transport.submit(&endpoint, &submission);
            // The stage may have been torn down; a dead channel is fine.
            let _ = tx.send(result);
        });
        tracing::info!(email, "waitlist submission dispatched");
        SubmitOutcome::Accepted
    }

    /// One form tick: absorb a settled reply, expire shown messages.
    pub fn tick(&mut self, now: f64) {
        if self.in_flight {
            if let Ok(result) = self.rx.try_recv() {
                self.in_flight = false;
                self.settle(result, now);
            }
        }
        if self.auto_hide.fire(now)
            && matches!(
                self.status,
                WaitlistStatus::AlreadyJoined | WaitlistStatus::Failed { .. }
            )
        {
            self.status = WaitlistStatus::Idle;
        }
    }

    /// The user edited the input: clear any shown error state.
    pub fn input_edited(&mut self) {
        if matches!(self.status, WaitlistStatus::Failed { .. }) {
            self.status = WaitlistStatus::Idle;
            self.auto_hide.cancel();
        }
    }

    /// Dismisses the success modal.
    pub fn dismiss(&mut self) {
        if self.status == WaitlistStatus::Joined {
            self.status = WaitlistStatus::Idle;
        }
    }

    fn settle(&mut self, result: Result<WaitlistResponse, TransportError>, now: f64) {
        match result {
            Ok(reply) if reply.success => {
                tracing::info!("waitlist joined");
                self.status = WaitlistStatus::Joined;
            }
            Ok(reply) if reply.error.as_deref() == Some(DUPLICATE_ERROR) => {
                self.status = WaitlistStatus::AlreadyJoined;
                self.auto_hide.arm(now, self.config.auto_hide);
            }
            Ok(reply) => {
                tracing::warn!(?reply.error, "waitlist rejected");
                self.show_failure("Something went wrong. Please try again.", now);
            }
            Err(error) => {
                tracing::warn!(%error, "waitlist transport failed");
                self.show_failure(
                    "Network error. Please check your connection and try again.",
                    now,
                );
            }
        }
    }

    fn show_failure(&mut self, message: &str, now: f64) {
        self.status = WaitlistStatus::Failed {
            message: message.to_string(),
        };
        self.auto_hide.arm(now, self.config.auto_hide);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counting transport with a scripted reply.
    struct ScriptedTransport {
        calls: AtomicUsize,
        reply: Result<WaitlistResponse, TransportError>,
    }

    impl ScriptedTransport {
        fn new(reply: Result<WaitlistResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WaitlistTransport for ScriptedTransport {
        fn submit(
            &self,
            _endpoint: &str,
            _submission: &Submission,
        ) -> Result<WaitlistResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn joined_reply() -> Result<WaitlistResponse, TransportError> {
        Ok(WaitlistResponse {
            success: true,
            error: None,
        })
    }

    fn settle(form: &mut WaitlistForm, mut now: f64) -> f64 {
        // The worker thread is real; poll briefly for its reply.
        for _ in 0..200 {
            form.tick(now);
            if !matches!(form.status(), WaitlistStatus::Loading) {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
            now += 0.005;
        }
        now
    }

    #[test]
    fn test_validation_matrix() {
        let transport = ScriptedTransport::new(joined_reply());
        let form = WaitlistForm::new(WaitlistConfig::default(), transport, true).unwrap();

        assert!(form.is_valid_email("a@b.co"));
        assert!(!form.is_valid_email("not-an-email"));
        assert!(!form.is_valid_email(""));
        assert!(!form.is_valid_email("a@b"));
        assert!(!form.is_valid_email("a b@c.de"));
    }

    #[test]
    fn test_invalid_email_never_reaches_network() {
        let transport = ScriptedTransport::new(joined_reply());
        let mut form = WaitlistForm::new(
            WaitlistConfig::default(),
            Arc::clone(&transport) as Arc<dyn WaitlistTransport>,
            true,
        )
        .unwrap();

        // Spaced past the debounce so every attempt reaches validation.
        for (i, email) in ["not-an-email", "", "a@b"].iter().enumerate() {
            let now = 100.0 + i as f64 * 3.0;
            let outcome = form.submit(now, email, SubmissionMeta::default());
            assert_eq!(outcome, SubmitOutcome::InvalidEmail);
        }
        assert_eq!(transport.calls(), 0);
        assert!(matches!(form.status(), WaitlistStatus::Failed { .. }));
    }

    #[test]
    fn test_transport_sees_trimmed_email_and_endpoint() {
        let mut mock = MockWaitlistTransport::new();
        mock.expect_submit()
            .withf(|endpoint, submission| {
                endpoint.contains("waitlist") && submission.email == "a@b.co"
            })
            .times(1)
            .returning(|_, _| {
                Ok(WaitlistResponse {
                    success: true,
                    error: None,
                })
            });

        let mut form =
            WaitlistForm::new(WaitlistConfig::default(), Arc::new(mock), true).unwrap();
        form.submit(0.0, "  a@b.co  ", SubmissionMeta::default());
        settle(&mut form, 0.0);
        assert_eq!(*form.status(), WaitlistStatus::Joined);
    }

    #[test]
    fn test_debounce_rejects_rapid_resubmission() {
        let transport = ScriptedTransport::new(joined_reply());
        let mut form = WaitlistForm::new(
            WaitlistConfig::default(),
            Arc::clone(&transport) as Arc<dyn WaitlistTransport>,
            true,
        )
        .unwrap();

        assert_eq!(
            form.submit(10.0, "a@b.co", SubmissionMeta::default()),
            SubmitOutcome::Accepted
        );
        settle(&mut form, 10.0);

        // Half a second later, inside the 2 s window: rejected locally.
        assert_eq!(
            form.submit(10.5, "a@b.co", SubmissionMeta::default()),
            SubmitOutcome::BlockedDebounce
        );
        assert_eq!(transport.calls(), 1);

        // Past the window: accepted again.
        assert_eq!(
            form.submit(12.5, "a@b.co", SubmissionMeta::default()),
            SubmitOutcome::Accepted
        );
        settle(&mut form, 12.5);
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_success_path() {
        let transport = ScriptedTransport::new(joined_reply());
        let mut form = WaitlistForm::new(WaitlistConfig::default(), transport, true).unwrap();

        form.submit(0.0, "a@b.co", SubmissionMeta::default());
        assert_eq!(*form.status(), WaitlistStatus::Loading);
        settle(&mut form, 0.0);
        assert_eq!(*form.status(), WaitlistStatus::Joined);

        form.dismiss();
        assert_eq!(*form.status(), WaitlistStatus::Idle);
    }

    #[test]
    fn test_duplicate_gets_friendlier_message() {
        let transport = ScriptedTransport::new(Ok(WaitlistResponse {
            success: false,
            error: Some(DUPLICATE_ERROR.to_string()),
        }));
        let mut form = WaitlistForm::new(WaitlistConfig::default(), transport, true).unwrap();

        form.submit(0.0, "a@b.co", SubmissionMeta::default());
        let now = settle(&mut form, 0.0);
        assert_eq!(*form.status(), WaitlistStatus::AlreadyJoined);

        // Auto-hides after the configured window.
        form.tick(now + 5.1);
        assert_eq!(*form.status(), WaitlistStatus::Idle);
    }

    #[test]
    fn test_network_failure_is_a_generic_retry() {
        let transport = ScriptedTransport::new(Err(TransportError::Request(
            "connection refused".to_string(),
        )));
        let mut form = WaitlistForm::new(WaitlistConfig::default(), transport, true).unwrap();

        form.submit(0.0, "a@b.co", SubmissionMeta::default());
        settle(&mut form, 0.0);
        let WaitlistStatus::Failed { message } = form.status() else {
            panic!("transport failure must surface as a retry message");
        };
        assert!(message.contains("connection"));

        // Editing the input clears the error state.
        form.input_edited();
        assert_eq!(*form.status(), WaitlistStatus::Idle);
    }

    #[test]
    fn test_missing_form_degrades() {
        let transport = ScriptedTransport::new(joined_reply());
        let mut form = WaitlistForm::new(
            WaitlistConfig::default(),
            Arc::clone(&transport) as Arc<dyn WaitlistTransport>,
            false,
        )
        .unwrap();

        assert_eq!(
            form.submit(0.0, "a@b.co", SubmissionMeta::default()),
            SubmitOutcome::Degraded
        );
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_in_flight_guard() {
        /// Transport that blocks until told to finish.
        struct SlowTransport;
        impl WaitlistTransport for SlowTransport {
            fn submit(
                &self,
                _endpoint: &str,
                _submission: &Submission,
            ) -> Result<WaitlistResponse, TransportError> {
                std::thread::sleep(Duration::from_millis(200));
                Ok(WaitlistResponse {
                    success: true,
                    error: None,
                })
            }
        }

        let mut form =
            WaitlistForm::new(WaitlistConfig::default(), Arc::new(SlowTransport), true).unwrap();
        assert_eq!(
            form.submit(0.0, "a@b.co", SubmissionMeta::default()),
            SubmitOutcome::Accepted
        );
        // Even past the debounce window, in-flight blocks.
        assert_eq!(
            form.submit(5.0, "a@b.co", SubmissionMeta::default()),
            SubmitOutcome::BlockedInFlight
        );
        settle(&mut form, 5.0);
        assert_eq!(*form.status(), WaitlistStatus::Joined);
    }
}
