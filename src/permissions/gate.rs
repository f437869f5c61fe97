//! Permission gate contract
//!
//! Samples whether shared storage may be written and triggers the consent
//! flow. Requesting consent never blocks; the returned [`ConsentRequest`]
//! can be dropped or awaited for the user's decision.

use tokio::sync::watch;

/// Permissions covered by a single consent prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoragePermission {
    ReadSharedStorage,
    WriteSharedStorage,
    AccessMediaLocation,
}

pub const REQUESTED_PERMISSIONS: [StoragePermission; 3] = [
    StoragePermission::ReadSharedStorage,
    StoragePermission::WriteSharedStorage,
    StoragePermission::AccessMediaLocation,
];

/// Permission as observed at call time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    NotGranted,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == PermissionState::Granted
    }
}

/// Where the consent flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentState {
    NotRequested,
    Pending,
    Granted,
    Denied,
}

impl ConsentState {
    pub fn is_decided(self) -> bool {
        matches!(self, ConsentState::Granted | ConsentState::Denied)
    }

    pub fn permission(self) -> PermissionState {
        match self {
            ConsentState::Granted => PermissionState::Granted,
            _ => PermissionState::NotGranted,
        }
    }
}

pub trait PermissionGate: Send + Sync {
    /// Cheap query of the current write permission. No side effects.
    fn is_granted(&self) -> bool;

    /// Starts the consent flow and returns at once
    fn request_consent(&self) -> ConsentRequest;
}

/// Handle on an outstanding consent request
#[derive(Debug)]
pub struct ConsentRequest {
    state: watch::Receiver<ConsentState>,
}

impl ConsentRequest {
    pub fn new(state: watch::Receiver<ConsentState>) -> Self {
        Self { state }
    }

    /// A request that is already answered
    pub fn resolved(state: ConsentState) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { state: rx }
    }

    pub fn current(&self) -> ConsentState {
        *self.state.borrow()
    }

    /// Waits until the user decides. A gate that goes away before deciding
    /// counts as not granted.
    pub async fn decision(mut self) -> PermissionState {
        match self.state.wait_for(|s| s.is_decided()).await {
            Ok(state) => state.permission(),
            Err(_) => PermissionState::NotGranted,
        }
    }
}

/// Gate with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct StaticGate {
    granted: bool,
}

impl StaticGate {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionGate for StaticGate {
    fn is_granted(&self) -> bool {
        self.granted
    }

    fn request_consent(&self) -> ConsentRequest {
        ConsentRequest::resolved(if self.granted {
            ConsentState::Granted
        } else {
            ConsentState::Denied
        })
    }
}
