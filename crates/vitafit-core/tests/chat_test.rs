//! Integration tests for the chat controller against the fake backend.

use std::time::Duration;

use serde_json::json;

use vitafit_core::api::{Backend, HttpBackend};
use vitafit_core::chat::{ChatController, ChatMessage, OverviewStatus, Sender};
use vitafit_core::config::BackendConfig;
use vitafit_core::session::SessionId;
use vitafit_core::stage::Completion;
use vitafit_test_utils::{FakeBackend, Reply, chat_body};

const OVERVIEW_PROMPT: &str = "Please provide an initial health overview based on my fitness data.";

fn client(fake: &FakeBackend) -> HttpBackend {
    HttpBackend::new(BackendConfig::new(fake.base_url()))
}

#[tokio::test]
async fn overview_then_chat_round_trip() {
    let fake = FakeBackend::start().await;
    fake.respond("/ai/overview", Reply::json(chat_body("Your BMI is healthy.")))
        .respond("/ai/chat", Reply::json(chat_body("Aim for 120g of protein.")));
    let backend = client(&fake);
    let session = SessionId::generate();
    let mut chat = ChatController::new(session);

    assert_eq!(chat.load_overview(&backend).await, Some(Completion::Applied));
    assert_eq!(chat.overview_status(), OverviewStatus::Ready);
    assert!(chat.load_overview(&backend).await.is_none(), "overview issued once");

    chat.set_input("How much protein?");
    assert_eq!(chat.send(&backend).await, Some(Completion::Applied));

    assert_eq!(
        chat.history(),
        &[
            ChatMessage::assistant("Your BMI is healthy."),
            ChatMessage::user("How much protein?"),
            ChatMessage::assistant("Aim for 120g of protein."),
        ]
    );
    assert_eq!(
        fake.bodies("/ai/overview"),
        vec![json!({ "session_id": session.to_string(), "message": OVERVIEW_PROMPT })]
    );
    assert_eq!(
        fake.bodies("/ai/chat"),
        vec![json!({ "session_id": session.to_string(), "message": "How much protein?" })]
    );
}

#[tokio::test]
async fn overview_failure_still_allows_chat() {
    let fake = FakeBackend::start().await;
    fake.respond(
        "/ai/overview",
        Reply::detail(404, json!("No exercise predictions found for session.")),
    )
    .respond("/ai/chat", Reply::json(chat_body("Let's start fresh.")));
    let backend = client(&fake);
    let mut chat = ChatController::new(SessionId::generate());

    chat.load_overview(&backend).await;
    assert_eq!(chat.overview_status(), OverviewStatus::Failed);
    assert_eq!(
        chat.overview_error(),
        Some("Error getting health overview: No exercise predictions found for session.")
    );
    assert_eq!(
        chat.history()[0].text,
        "Failed to load initial overview: No exercise predictions found for session."
    );
    assert!(chat.input_enabled());

    chat.set_input("hello");
    chat.send(&backend).await;
    assert_eq!(chat.history().len(), 3);
}

#[tokio::test]
async fn blank_input_issues_no_request() {
    let fake = FakeBackend::start().await;
    fake.respond("/ai/overview", Reply::json(chat_body("hi")))
        .respond("/ai/chat", Reply::json(chat_body("unused")));
    let backend = client(&fake);
    let mut chat = ChatController::new(SessionId::generate());
    chat.load_overview(&backend).await;

    chat.set_input("   ");
    assert!(chat.send(&backend).await.is_none());
    assert_eq!(fake.hits("/ai/chat"), 0);
}

#[tokio::test]
async fn failed_send_degrades_into_message() {
    let fake = FakeBackend::start().await;
    fake.respond("/ai/overview", Reply::json(chat_body("hi")))
        .respond("/ai/chat", Reply::detail(500, json!("LLM unavailable")));
    let backend = client(&fake);
    let mut chat = ChatController::new(SessionId::generate());
    chat.load_overview(&backend).await;

    chat.set_input("plan for tomorrow?");
    chat.send(&backend).await;

    let history = chat.history();
    assert_eq!(history[1], ChatMessage::user("plan for tomorrow?"));
    assert_eq!(history[2].sender, Sender::Assistant);
    assert_eq!(history[2].text, "Error: LLM unavailable");
    assert!(chat.input_enabled());
}

#[tokio::test]
async fn second_send_while_pending_is_noop() {
    let fake = FakeBackend::start().await;
    fake.respond("/ai/overview", Reply::json(chat_body("hi")))
        .respond(
            "/ai/chat",
            Reply::json(chat_body("done")).delayed(Duration::from_millis(30)),
        );
    let backend = client(&fake);
    let mut chat = ChatController::new(SessionId::generate());
    chat.load_overview(&backend).await;

    chat.set_input("first");
    let (ticket, req) = chat.begin_send().unwrap();
    chat.set_input("second");
    assert!(chat.begin_send().is_none());

    let reply = backend.chat(&req).await;
    chat.finish_send(ticket, reply);
    assert_eq!(fake.hits("/ai/chat"), 1);
    assert_eq!(chat.input(), "second", "unsent input is kept");
    assert_eq!(chat.history().last(), Some(&ChatMessage::assistant("done")));
}

#[tokio::test]
async fn failures_without_detail_show_generic_text() {
    let fake = FakeBackend::start().await;
    fake.respond("/ai/overview", Reply::status(500, json!(null)));
    let backend = client(&fake);
    let mut chat = ChatController::new(SessionId::generate());

    chat.load_overview(&backend).await;
    assert_eq!(
        chat.history(),
        &[ChatMessage::assistant(
            "Failed to load initial overview: An unknown error occurred."
        )]
    );
    assert_eq!(
        chat.overview_error(),
        Some("Error getting health overview: An unknown error occurred.")
    );

    // Nothing listens on port 1, so the send fails in transport.
    let unreachable = HttpBackend::new(BackendConfig::new("http://127.0.0.1:1"));
    chat.set_input("anyone there?");
    chat.send(&unreachable).await;
    assert_eq!(
        chat.history().last(),
        Some(&ChatMessage::assistant("Error: An unknown error occurred."))
    );
}
