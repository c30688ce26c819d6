use std::time::Duration;

use tracing::debug;

use crate::lifecycle::{Delay, StateHandle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

/// Identifies one open period of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraceTicket(u64);

/// Visibility of the modal registration form.
///
/// `generation` bumps on every transition. A grace close only applies to
/// the generation it was issued for, so it cannot re-open or re-close an
/// overlay the user already dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationOverlay {
    state: OverlayState,
    generation: u64,
}

impl RegistrationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == OverlayState::Open
    }

    /// Flip between closed and open. Used by the action link and by the
    /// explicit close affordance.
    pub fn toggle(&mut self) -> OverlayState {
        self.state = match self.state {
            OverlayState::Closed => OverlayState::Open,
            OverlayState::Open => OverlayState::Closed,
        };
        self.generation += 1;
        self.state
    }

    /// The form reported success; returns the ticket for the grace close.
    pub fn begin_grace(&self) -> Option<GraceTicket> {
        self.is_open().then_some(GraceTicket(self.generation))
    }

    /// Close if the overlay is still in the ticket's open period.
    pub fn finish_grace(&mut self, ticket: GraceTicket) -> bool {
        if !self.is_open() || ticket.0 != self.generation {
            debug!("grace close skipped, overlay changed meanwhile");
            return false;
        }
        self.state = OverlayState::Closed;
        self.generation += 1;
        true
    }
}

/// Wait the grace period after a successful registration, then close.
pub async fn close_after_grace<H, D>(overlay: &H, delay: &D, grace: Duration) -> bool
where
    H: StateHandle<RegistrationOverlay>,
    D: Delay,
{
    let Some(ticket) = overlay.read(|o| o.begin_grace()) else {
        return false;
    };
    delay.sleep(grace).await;
    overlay.update(|o| o.finish_grace(ticket))
}
