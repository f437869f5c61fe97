//! Consent-driven permission gate
//!
//! Holds the consent state in a watch channel. Whoever plays the user
//! (the operator console) answers with [`ConsentGate::grant`] or
//! [`ConsentGate::deny`]; every outstanding request resolves at that point.

use log::info;
use tokio::sync::watch;

use super::gate::{ConsentRequest, ConsentState, PermissionGate, REQUESTED_PERMISSIONS};

#[derive(Debug)]
pub struct ConsentGate {
    state: watch::Sender<ConsentState>,
}

impl Default for ConsentGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConsentState::NotRequested);
        Self { state }
    }

    pub fn state(&self) -> ConsentState {
        *self.state.borrow()
    }

    pub fn grant(&self) {
        self.state.send_replace(ConsentState::Granted);
        info!("Storage consent granted");
    }

    pub fn deny(&self) {
        self.state.send_replace(ConsentState::Denied);
        info!("Storage consent denied");
    }

    /// Withdraws a previous grant; the next request prompts again
    pub fn revoke(&self) {
        self.state.send_replace(ConsentState::NotRequested);
        info!("Storage consent revoked");
    }
}

impl PermissionGate for ConsentGate {
    fn is_granted(&self) -> bool {
        self.state() == ConsentState::Granted
    }

    fn request_consent(&self) -> ConsentRequest {
        let prompted = self.state.send_if_modified(|state| match state {
            ConsentState::Granted | ConsentState::Pending => false,
            _ => {
                *state = ConsentState::Pending;
                true
            }
        });

        if prompted {
            info!(
                "Storage consent requested for {:?}; answer with 'grant' or 'deny'",
                REQUESTED_PERMISSIONS
            );
        }

        ConsentRequest::new(self.state.subscribe())
    }
}
