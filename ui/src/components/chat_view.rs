use dioxus::prelude::*;
use tracing::debug;

use sara_common::lifecycle::TurnController;
use sara_common::message::Sender;
use sara_common::render::{MessageBody, RenderedMessage, TranscriptEntry};

use super::assistant_client::GlooDelay;
use super::markdown_view::{DocumentGalleryView, MarkdownBlocks};
use super::registration_form::RegistrationOverlayView;
use super::session::{use_chat_session, use_chat_session_provider};

/// The Sara widget: transcript, composer and the registration overlay.
#[component]
pub fn ChatWidget() -> Element {
    let session = use_chat_session_provider();
    let conversation = session.conversation;

    // Keep the newest message in view.
    use_effect(move || {
        let _revision = conversation.read().store().revision();
        let _pending = conversation.read().is_pending();
        let _ = document::eval(
            "const el = document.getElementById('sara-messages'); \
             if (el) { el.scrollTop = el.scrollHeight; }",
        );
    });

    rsx! {
        div { class: "sara-chat",
            div { class: "sara-chat-header",
                h3 { "Sara" }
                span { class: "sara-chat-subtitle", "Asesora virtual UBE" }
            }
            Transcript {}
            Composer {}
            RegistrationOverlayView {}
        }
    }
}

#[component]
fn Transcript() -> Element {
    let session = use_chat_session();
    let entries = session.renderer.transcript(&session.conversation.read());
    let open_registration = {
        let session = session.clone();
        use_callback(move |_: ()| session.toggle_overlay())
    };

    rsx! {
        div { id: "sara-messages", class: "sara-messages",
            for (i, entry) in entries.into_iter().enumerate() {
                {
                    match entry {
                        TranscriptEntry::Message(message) => rsx! {
                            MessageBubble {
                                key: "{i}",
                                message,
                                on_action: open_registration,
                            }
                        },
                        TranscriptEntry::Typing => {
                            let typing_key = "typing";
                            rsx! {
                                div { key: "{typing_key}", class: "chat-bubble chat-received typing-indicator",
                                    span { class: "dot" }
                                    span { class: "dot" }
                                    span { class: "dot" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn MessageBubble(message: RenderedMessage, on_action: EventHandler<()>) -> Element {
    let bubble_class = match message.sender {
        Sender::User => "chat-bubble chat-sent",
        Sender::Bot => "chat-bubble chat-received",
    };

    rsx! {
        div { class: "{bubble_class}",
            {
                match &message.body {
                    MessageBody::Plain(text) => rsx! { p { "{text}" } },
                    MessageBody::Markdown(blocks) => rsx! {
                        div { class: "markdown-content",
                            MarkdownBlocks { blocks: blocks.clone(), on_action }
                        }
                    },
                }
            }
            if let Some(gallery) = message.gallery.clone() {
                DocumentGalleryView { gallery }
            }
            span { class: "chat-time", "{message.time}" }
        }
    }
}

#[component]
fn Composer() -> Element {
    let session = use_chat_session();
    let mut conversation = session.conversation;
    let pending = conversation.read().is_pending();
    let can_submit = conversation.read().can_submit();
    let input = conversation.read().input().to_string();

    let submit = move || {
        let text = conversation.read().input().to_string();
        let controller = TurnController::new(
            session.backend.clone(),
            GlooDelay,
            &session.config,
        );
        let handle = session.conversation_handle();
        let turn = session.tasks.track(async move {
            controller.submit_user_turn(&handle, &text).await
        });
        spawn(async move {
            match turn.await {
                Ok(outcome) => debug!(?outcome, "turn finished"),
                Err(_) => debug!("turn cancelled"),
            }
        });
    };

    let on_click = submit.clone();
    let on_enter = submit;

    rsx! {
        div { class: "chat-input",
            input {
                r#type: "text",
                placeholder: "Escribe tu mensaje...",
                value: "{input}",
                disabled: pending,
                oninput: move |evt| conversation.write().set_input(evt.value()),
                onkeypress: move |evt: KeyboardEvent| {
                    if evt.key() == Key::Enter {
                        on_enter();
                    }
                },
            }
            button {
                class: "chat-send-btn",
                disabled: !can_submit,
                onclick: move |_| on_click(),
                "Enviar"
            }
        }
    }
}
