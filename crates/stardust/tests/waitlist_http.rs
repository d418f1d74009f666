//! Real-HTTP waitlist round trip against a mock endpoint.
//!
//! The form's worker thread runs the blocking client off the async
//! runtime, exactly as it does under a real stage; the test only uses the
//! runtime to host the mock server and to pace the polling loop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stardust::core::WaitlistConfig;
use stardust::page::{
    HttpTransport, SubmissionMeta, SubmitOutcome, WaitlistForm, WaitlistStatus,
};

/// Builds the form off the async runtime; the blocking client owns its own
/// connection thread.
async fn form_for(endpoint: String) -> WaitlistForm {
    tokio::task::spawn_blocking(move || {
        let config = WaitlistConfig {
            endpoint,
            ..WaitlistConfig::default()
        };
        let transport = Arc::new(HttpTransport::new().expect("client construction"));
        WaitlistForm::new(config, transport, true).expect("form construction")
    })
    .await
    .expect("construction task")
}

async fn settle(form: &mut WaitlistForm) {
    let mut now = 0.0;
    for _ in 0..400 {
        form.tick(now);
        if !matches!(form.status(), WaitlistStatus::Loading) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        now += 0.005;
    }
    panic!("waitlist request never settled");
}

#[tokio::test]
async fn waitlist_joined_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/join"))
        .and(body_string_contains("email=a%40b.co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = form_for(format!("{}/join", server.uri())).await;
    let outcome = form.submit(
        0.0,
        "a@b.co",
        SubmissionMeta {
            client_timestamp: "0.000".to_string(),
            user_agent: "stardust-test".to_string(),
            ..SubmissionMeta::default()
        },
    );
    assert_eq!(outcome, SubmitOutcome::Accepted);

    settle(&mut form).await;
    assert_eq!(*form.status(), WaitlistStatus::Joined);
}

#[tokio::test]
async fn waitlist_duplicate_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/join"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "Email already exists" })),
        )
        .mount(&server)
        .await;

    let mut form = form_for(format!("{}/join", server.uri())).await;
    form.submit(0.0, "a@b.co", SubmissionMeta::default());
    settle(&mut form).await;
    assert_eq!(*form.status(), WaitlistStatus::AlreadyJoined);
}

#[tokio::test]
async fn waitlist_unreachable_endpoint_is_a_connection_failure() {
    // Nothing listens on this port; the reply must classify as a network
    // failure, not a panic or a hang.
    let mut form = form_for("http://127.0.0.1:9/join".to_string()).await;
    form.submit(0.0, "a@b.co", SubmissionMeta::default());
    settle(&mut form).await;

    let WaitlistStatus::Failed { message } = form.status() else {
        panic!("unreachable endpoint must surface a retry message");
    };
    assert!(message.contains("connection"));
}
