use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use sara_chat_integration::harness::{unreachable_base_url, MockBackend, Scripted};
use sara_chat_integration::{chat_body, test_config, ReqwestBackend, TokioDelay};
use sara_common::config::{ChatConfig, APOLOGY_TEXT, FOLLOW_UP_TEXT, GREETING_TEXT};
use sara_common::conversation::ConversationState;
use sara_common::lifecycle::{TurnController, TurnOutcome};
use sara_common::message::Sender;
use sara_common::render::{LinkIntent, MessageBody, Renderer, TranscriptEntry};

fn session(config: &ChatConfig) -> Rc<RefCell<ConversationState>> {
    Rc::new(RefCell::new(ConversationState::new(config)))
}

fn controller(config: &ChatConfig) -> TurnController<ReqwestBackend, TokioDelay> {
    TurnController::new(ReqwestBackend::new(config), TokioDelay, config)
}

fn texts(state: &Rc<RefCell<ConversationState>>) -> Vec<(Sender, String)> {
    state
        .borrow()
        .messages()
        .iter()
        .map(|m| (m.sender, m.text.clone()))
        .collect()
}

#[tokio::test]
async fn first_turn_round_trip() {
    let mock = MockBackend::start().await;
    mock.script_chat(Scripted::json(200, chat_body("Bienvenido", json!([]), None)))
        .await;
    let config = test_config(&mock.base_url);
    let state = session(&config);

    let outcome = controller(&config).submit_user_turn(&state, "hola").await;

    assert_eq!(outcome, TurnOutcome::Answered);
    assert_eq!(
        texts(&state),
        vec![
            (Sender::Bot, GREETING_TEXT.to_string()),
            (Sender::User, "hola".to_string()),
            (Sender::Bot, "Bienvenido".to_string()),
            (Sender::Bot, FOLLOW_UP_TEXT.to_string()),
        ]
    );
    assert_eq!(mock.chat_requests().await, vec![json!({ "message": "hola" })]);
    assert!(!state.borrow().is_pending());
}

#[tokio::test]
async fn server_session_id_is_sent_on_later_turns() {
    let mock = MockBackend::start().await;
    mock.script_chat(Scripted::json(200, chat_body("Hola", json!([]), Some("s-42"))))
        .await;
    mock.script_chat(Scripted::json(200, chat_body("Claro", json!([]), None)))
        .await;
    let config = test_config(&mock.base_url);
    let state = session(&config);
    let turns = controller(&config);

    turns.submit_user_turn(&state, "hola").await;
    turns.submit_user_turn(&state, "¿qué carreras hay?").await;

    let requests = mock.chat_requests().await;
    assert_eq!(requests[0], json!({ "message": "hola" }));
    assert_eq!(
        requests[1],
        json!({ "message": "¿qué carreras hay?", "session_id": "s-42" })
    );
    assert_eq!(state.borrow().messages().len(), 7);
}

#[tokio::test]
async fn server_error_becomes_apology() {
    let mock = MockBackend::start().await;
    mock.script_chat(Scripted::json(500, json!({ "detail": "boom" })))
        .await;
    let config = test_config(&mock.base_url);
    let state = session(&config);

    let outcome = controller(&config).submit_user_turn(&state, "hola").await;

    assert_eq!(outcome, TurnOutcome::Apologized);
    let messages = texts(&state);
    assert_eq!(messages[2], (Sender::Bot, APOLOGY_TEXT.to_string()));
    assert_eq!(messages[3], (Sender::Bot, FOLLOW_UP_TEXT.to_string()));
}

#[tokio::test]
async fn malformed_payload_becomes_apology() {
    let mock = MockBackend::start().await;
    mock.script_chat(Scripted::raw(200, "<html>gateway</html>")).await;
    mock.script_chat(Scripted::json(200, json!({ "documentos": [] })))
        .await;
    let config = test_config(&mock.base_url);
    let state = session(&config);
    let turns = controller(&config);

    assert_eq!(
        turns.submit_user_turn(&state, "hola").await,
        TurnOutcome::Apologized
    );
    assert_eq!(
        turns.submit_user_turn(&state, "hola otra vez").await,
        TurnOutcome::Apologized
    );
    assert_eq!(texts(&state)[5], (Sender::Bot, APOLOGY_TEXT.to_string()));
}

#[tokio::test]
async fn unreachable_backend_becomes_apology() {
    let config = test_config(&unreachable_base_url().await);
    let state = session(&config);

    let outcome = controller(&config).submit_user_turn(&state, "hola").await;

    assert_eq!(outcome, TurnOutcome::Apologized);
    assert_eq!(state.borrow().messages().len(), 4);
}

#[tokio::test]
async fn documents_render_as_gallery_links() {
    let mock = MockBackend::start().await;
    let documentos = json!([
        { "id": 7, "nombre": "Malla Derecho", "fecha_upload": "2024-05-01" },
        { "id": "abc", "nombre": "Horarios" }
    ]);
    mock.script_chat(Scripted::json(
        200,
        chat_body("| Día | Hora |\n|---|---|\n| Lunes | 10:00 |", documentos, None),
    ))
    .await;
    let config = test_config(&mock.base_url);
    let state = session(&config);

    controller(&config).submit_user_turn(&state, "horarios").await;

    let renderer = Renderer::from_config(&config);
    let rendered = renderer.render(&state.borrow().messages()[2]);
    let gallery = rendered.gallery.expect("reply carries documents");
    let hrefs: Vec<_> = gallery.tiles.iter().map(|t| t.href.clone()).collect();
    assert_eq!(
        hrefs,
        vec![
            format!("{}/documentos/7", mock.base_url),
            format!("{}/documentos/abc", mock.base_url),
        ]
    );
    assert!(gallery
        .tiles
        .iter()
        .all(|t| t.thumbnail == config.document_thumbnail));
    assert!(matches!(rendered.body, MessageBody::Markdown(ref blocks) if !blocks.is_empty()));

    // The follow-up renders its link as the registration action.
    let follow_up = renderer.render(&state.borrow().messages()[3]);
    let MessageBody::Markdown(blocks) = follow_up.body else {
        panic!("bot messages render as markdown");
    };
    let debug = format!("{blocks:?}");
    assert!(debug.contains(&format!("{:?}", LinkIntent::Registration)));
}

#[tokio::test]
async fn typing_indicator_tracks_pending_turn() {
    let mock = MockBackend::start().await;
    mock.script_chat(
        Scripted::json(200, chat_body("Listo", json!([]), None))
            .after(std::time::Duration::from_millis(200)),
    )
    .await;
    let config = test_config(&mock.base_url);
    let state = session(&config);
    let renderer = Renderer::from_config(&config);
    let turns = controller(&config);

    let turn = turns.submit_user_turn(&state, "hola");
    tokio::pin!(turn);
    tokio::select! {
        _ = &mut turn => panic!("reply arrived before the scripted latency"),
        _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {}
    }
    let during = renderer.transcript(&state.borrow());
    assert_eq!(during.last(), Some(&TranscriptEntry::Typing));
    assert!(!state.borrow().can_submit());

    turn.await;
    let after = renderer.transcript(&state.borrow());
    assert!(!after.contains(&TranscriptEntry::Typing));
    assert_eq!(after.len(), 4);
}
