use std::rc::Rc;

use dioxus::prelude::*;

use sara_common::config::ChatConfig;
use sara_common::conversation::ConversationState;
use sara_common::lifecycle::StateHandle;
use sara_common::overlay::{OverlayState, RegistrationOverlay};
use sara_common::registration::{FormStatus, RegistrationForm};
use sara_common::render::Renderer;
use sara_common::tasks::ScheduledTasks;

use super::assistant_client::{chat_config, RemoteBackend};

/// Lets the shared lifecycle code drive a Dioxus signal.
#[derive(Clone, Copy)]
pub struct SignalHandle<T: 'static>(pub Signal<T>);

impl<T: 'static> StateHandle<T> for SignalHandle<T> {
    fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut signal = self.0;
        let mut guard = signal.write();
        f(&mut guard)
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read())
    }
}

/// Everything one mounted chat widget owns.
///
/// Created once per widget instance and provided through context, so the
/// transcript, the composer and the registration overlay share it.
#[derive(Clone)]
pub struct ChatSession {
    pub config: Rc<ChatConfig>,
    pub conversation: Signal<ConversationState>,
    pub overlay: Signal<RegistrationOverlay>,
    pub registration: Signal<RegistrationForm>,
    pub renderer: Rc<Renderer>,
    pub backend: RemoteBackend,
    pub tasks: Rc<ScheduledTasks>,
}

impl ChatSession {
    pub fn conversation_handle(&self) -> SignalHandle<ConversationState> {
        SignalHandle(self.conversation)
    }

    pub fn overlay_handle(&self) -> SignalHandle<RegistrationOverlay> {
        SignalHandle(self.overlay)
    }

    pub fn registration_handle(&self) -> SignalHandle<RegistrationForm> {
        SignalHandle(self.registration)
    }

    /// Flip the registration overlay. Bound to the `#registro` action and
    /// the overlay's close button. Opening starts from an empty form unless a
    /// submission is still in flight.
    pub fn toggle_overlay(&self) {
        let mut overlay = self.overlay;
        let mut registration = self.registration;
        if overlay.write().toggle() == OverlayState::Open
            && *registration.read().status() != FormStatus::Submitting
        {
            registration.set(RegistrationForm::new());
        }
    }

    /// Stop background work and freeze the transcript.
    pub fn teardown(&self) {
        self.tasks.cancel_all();
        let mut conversation = self.conversation;
        if let Ok(mut state) = conversation.try_write() {
            state.close();
        };
    }
}

/// Build a session for the calling component and provide it to children.
/// Tears it down when the component unmounts.
pub fn use_chat_session_provider() -> ChatSession {
    let config = use_hook(|| Rc::new(chat_config()));
    let conversation = use_signal(|| ConversationState::new(&config));
    let overlay = use_signal(RegistrationOverlay::new);
    let registration = use_signal(RegistrationForm::new);
    let session = use_context_provider(|| ChatSession {
        renderer: Rc::new(Renderer::from_config(&config)),
        backend: RemoteBackend::new(&config),
        tasks: Rc::new(ScheduledTasks::new()),
        config: config.clone(),
        conversation,
        overlay,
        registration,
    });

    let on_drop = session.clone();
    use_drop(move || on_drop.teardown());

    session
}

pub fn use_chat_session() -> ChatSession {
    use_context::<ChatSession>()
}
