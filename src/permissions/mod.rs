//! Storage permission gate
//!
//! Decides whether shared storage may be written and drives the consent flow.

pub mod consent;
pub mod gate;

pub use consent::ConsentGate;
pub use gate::{
    ConsentRequest, ConsentState, PermissionGate, PermissionState, StaticGate,
    StoragePermission, REQUESTED_PERMISSIONS,
};
