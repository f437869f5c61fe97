//! Error handlers
//!
//! Provides error logging and mapping to method channel error codes.

use crate::error::types::BridgeError;
use log::error;

/// Log a bridge error
pub fn handle_error(err: &BridgeError) {
    error!("Storage bridge error: {}", err);
}

/// Convert an error to the code reported in a channel error reply
pub fn error_to_channel_code(err: &BridgeError) -> &'static str {
    match err {
        BridgeError::Storage(_) => "STORAGE_ERROR",
        BridgeError::Ingest(_) => "INGEST_ERROR",
        BridgeError::Channel(_) => "BAD_ARGS",
        BridgeError::Config(_) => "CONFIG_ERROR",
        BridgeError::IoError(_) => "IO_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChannelError;

    #[test]
    fn malformed_calls_map_to_bad_args() {
        let err = BridgeError::from(ChannelError::MissingArgument("path"));
        assert_eq!(error_to_channel_code(&err), "BAD_ARGS");
        assert_eq!(err.to_string(), "Channel error: Missing argument: path");
    }
}
