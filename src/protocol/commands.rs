//! Module `commands`
//!
//! Parses method calls received on the channel. One call per line:
//! `{"method": "saveFile", "arguments": {"path": "/data/track.mp3"}}`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ChannelError;

/// Name the host application uses to reach this bridge
pub const CHANNEL_NAME: &str = "com.example.androidstorage.android_12_flutter_storage/storage";

/// A method call understood by the bridge
#[derive(Debug, PartialEq)]
pub enum Method {
    /// Start the consent flow; the reply does not wait for the answer
    RequestStoragePermission,
    /// Copy a local file into shared storage
    SaveFile { path: String },
    CheckStoragePermission,
    /// Start the consent flow and reply with the user's decision
    AwaitStoragePermission,
    Channel,
    NotImplemented(String),
}

#[derive(Debug, Deserialize)]
struct RawCall {
    method: String,
    #[serde(default)]
    arguments: Value,
}

/// Parses a raw call line into a [`Method`].
///
/// Unknown method names are not an error; they map to `NotImplemented`.
pub fn parse_call(raw: &str) -> Result<Method, ChannelError> {
    let call: RawCall = serde_json::from_str(raw.trim())?;

    let method = match call.method.as_str() {
        "requestStoragePermission" => Method::RequestStoragePermission,
        "saveFile" => {
            let path = call
                .arguments
                .get("path")
                .and_then(Value::as_str)
                .ok_or(ChannelError::MissingArgument("path"))?;
            Method::SaveFile {
                path: path.to_string(),
            }
        }
        "checkStoragePermission" => Method::CheckStoragePermission,
        "awaitStoragePermission" => Method::AwaitStoragePermission,
        "channel" => Method::Channel,
        _ => Method::NotImplemented(call.method),
    };

    Ok(method)
}
