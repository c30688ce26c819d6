//! Async driver for a single user turn.
//!
//! The controller is generic over the assistant transport and the delay
//! source so the same sequencing runs in the browser (fetch + gloo timers)
//! and under tokio in tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::{AssistantReply, ChatError, ChatRequest};
use crate::config::ChatConfig;
use crate::conversation::ConversationState;

/// Transport to the assistant endpoint.
#[allow(async_fn_in_trait)]
pub trait AssistantService {
    /// Send one `POST /chat`. Any failure, including a bad payload, is an `Err`.
    async fn send(&self, request: &ChatRequest) -> Result<AssistantReply, ChatError>;
}

/// Source of fixed delays (`gloo-timers` in the browser, tokio in tests).
#[allow(async_fn_in_trait)]
pub trait Delay {
    async fn sleep(&self, duration: Duration);
}

/// Shared, mutable access to session state that lives across awaits.
pub trait StateHandle<T> {
    fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> StateHandle<T> for Rc<RefCell<T>> {
    fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.borrow_mut())
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.borrow())
    }
}

/// How a call to [`TurnController::submit_user_turn`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, a turn already in flight, or a closed session.
    Ignored,
    Answered,
    Apologized,
}

/// Runs the request/response lifecycle of one user turn.
pub struct TurnController<A, D> {
    assistant: A,
    delay: D,
    follow_up_delay: Duration,
}

impl<A: AssistantService, D: Delay> TurnController<A, D> {
    pub fn new(assistant: A, delay: D, config: &ChatConfig) -> Self {
        Self {
            assistant,
            delay,
            follow_up_delay: config.follow_up_delay(),
        }
    }

    /// Submit one user turn.
    ///
    /// Appends the user message and raises `pending`, awaits the assistant,
    /// appends the reply (or the apology) and drops `pending`, then waits the
    /// follow-up delay and appends the registration prompt. `pending` is
    /// already false while the follow-up delay runs.
    pub async fn submit_user_turn<H>(&self, state: &H, text: &str) -> TurnOutcome
    where
        H: StateHandle<ConversationState>,
    {
        let Some(turn) = state.update(|s| s.begin_turn(text)) else {
            return TurnOutcome::Ignored;
        };

        let result = self.assistant.send(&turn.request).await;
        let outcome = match &result {
            Ok(reply) => {
                info!(documents = reply.documents.len(), "assistant replied");
                TurnOutcome::Answered
            }
            Err(err) => {
                warn!(error = %err, "assistant exchange failed, showing apology");
                TurnOutcome::Apologized
            }
        };
        state.update(|s| s.complete_turn(result));

        self.delay.sleep(self.follow_up_delay).await;
        state.update(|s| s.push_follow_up());

        outcome
    }
}
