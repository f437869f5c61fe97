//! Method call handlers for the storage bridge.
//!
//! Dispatches parsed calls to the permission gate and the ingestion service.
//! `saveFile` and `requestStoragePermission` never report *why* they failed;
//! the caller only sees a locator or `null`.

use log::{error, info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::config::SharedRuntimeConfig;
use crate::error::BridgeError;
use crate::error::handlers::{error_to_channel_code, handle_error};
use crate::ingest::{IngestLimits, IngestService};
use crate::protocol::commands::{CHANNEL_NAME, Method, parse_call};
use crate::protocol::responses::MethodReply;

/// Everything a connection needs to serve calls
pub struct BridgeContext {
    pub service: Arc<IngestService>,
    pub runtime: SharedRuntimeConfig,
}

/// Parses and dispatches one call line
pub async fn handle_call(raw: &str, context: &BridgeContext) -> MethodReply {
    match parse_call(raw) {
        Ok(method) => handle_method(method, context).await,
        Err(e) => error_reply(BridgeError::from(e)),
    }
}

pub async fn handle_method(method: Method, context: &BridgeContext) -> MethodReply {
    match method {
        Method::RequestStoragePermission => handle_request_permission(context),
        Method::SaveFile { path } => handle_save_file(path, context).await,
        Method::CheckStoragePermission => {
            MethodReply::Success(Value::Bool(context.service.gate().is_granted()))
        }
        Method::AwaitStoragePermission => handle_await_permission(context).await,
        Method::Channel => MethodReply::Success(Value::String(CHANNEL_NAME.to_string())),
        Method::NotImplemented(name) => {
            warn!("Method not implemented: {}", name);
            MethodReply::NotImplemented
        }
    }
}

fn error_reply(err: BridgeError) -> MethodReply {
    handle_error(&err);
    MethodReply::Error {
        code: error_to_channel_code(&err).to_string(),
        message: err.to_string(),
    }
}

/// Fire-and-forget: the decision is observed by a later permission check
fn handle_request_permission(context: &BridgeContext) -> MethodReply {
    drop(context.service.gate().request_consent());
    MethodReply::Success(Value::Null)
}

async fn handle_await_permission(context: &BridgeContext) -> MethodReply {
    let decision = context.service.gate().request_consent().decision().await;
    info!("Storage consent decision delivered: {:?}", decision);
    MethodReply::Success(Value::Bool(decision.is_granted()))
}

/// Runs the blocking copy off the async workers
async fn handle_save_file(path: String, context: &BridgeContext) -> MethodReply {
    let limits = {
        let runtime = context.runtime.read().await;
        IngestLimits::from(&*runtime)
    };

    let service = Arc::clone(&context.service);
    let saved = tokio::task::spawn_blocking(move || service.save_file(&path, &limits)).await;

    match saved {
        Ok(Some(locator)) => MethodReply::Success(Value::String(locator.to_string())),
        Ok(None) => MethodReply::Success(Value::Null),
        Err(e) => {
            error!("saveFile task failed: {}", e);
            MethodReply::Success(Value::Null)
        }
    }
}
