//! Operator console
//!
//! Reads commands from stdin. The operator answers consent prompts here and
//! can adjust runtime configuration without a restart.

use log::{info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{MAX_FILE_SIZE_MB_LIMIT, SharedRuntimeConfig};
use crate::permissions::ConsentGate;

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand {
    Grant,
    Deny,
    Revoke,
    Status,
    SetMaxFileSize(u64),
    SetCleanup(bool),
    Help,
    Unknown(String),
}

pub fn parse_console_command(raw: &str) -> ConsoleCommand {
    let parts: Vec<&str> = raw.split_whitespace().collect();

    match parts.as_slice() {
        ["grant"] => ConsoleCommand::Grant,
        ["deny"] => ConsoleCommand::Deny,
        ["revoke"] => ConsoleCommand::Revoke,
        ["status"] => ConsoleCommand::Status,
        ["help"] | ["?"] => ConsoleCommand::Help,
        ["set", "max_file_size_mb", value] => match value.parse::<u64>() {
            Ok(mb) if mb > 0 && mb <= MAX_FILE_SIZE_MB_LIMIT => {
                ConsoleCommand::SetMaxFileSize(mb)
            }
            _ => ConsoleCommand::Unknown(raw.trim().to_string()),
        },
        ["set", "cleanup_partial_entries", value] => match value.parse::<bool>() {
            Ok(enabled) => ConsoleCommand::SetCleanup(enabled),
            Err(_) => ConsoleCommand::Unknown(raw.trim().to_string()),
        },
        _ => ConsoleCommand::Unknown(raw.trim().to_string()),
    }
}

/// Applies a command and returns the text shown to the operator
pub async fn apply_console_command(
    command: ConsoleCommand,
    gate: &ConsentGate,
    runtime: &SharedRuntimeConfig,
) -> String {
    match command {
        ConsoleCommand::Grant => {
            gate.grant();
            "consent granted".to_string()
        }
        ConsoleCommand::Deny => {
            gate.deny();
            "consent denied".to_string()
        }
        ConsoleCommand::Revoke => {
            gate.revoke();
            "consent revoked".to_string()
        }
        ConsoleCommand::Status => {
            let runtime = runtime.read().await;
            format!(
                "consent: {:?}, max_file_size_mb: {}, cleanup_partial_entries: {}",
                gate.state(),
                runtime.max_file_size_mb,
                runtime.cleanup_partial_entries
            )
        }
        ConsoleCommand::SetMaxFileSize(mb) => {
            runtime.write().await.max_file_size_mb = mb;
            format!("max_file_size_mb set to {}", mb)
        }
        ConsoleCommand::SetCleanup(enabled) => {
            runtime.write().await.cleanup_partial_entries = enabled;
            format!("cleanup_partial_entries set to {}", enabled)
        }
        ConsoleCommand::Help => "commands: grant | deny | revoke | status | \
             set max_file_size_mb <n> | set cleanup_partial_entries <true|false>"
            .to_string(),
        ConsoleCommand::Unknown(raw) => format!("unknown command: {} (try 'help')", raw),
    }
}

/// Runs until stdin closes
pub async fn run_console(gate: Arc<ConsentGate>, runtime: SharedRuntimeConfig) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                let command = parse_console_command(&line);
                let response = apply_console_command(command, &gate, &runtime).await;
                info!("console: {}", response);
            }
            Ok(None) => {
                info!("Console input closed");
                return;
            }
            Err(e) => {
                warn!("Console read failed: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::permissions::{ConsentState, PermissionGate};
    use tokio::sync::RwLock;

    fn runtime() -> SharedRuntimeConfig {
        Arc::new(RwLock::new(RuntimeConfig {
            max_file_size_mb: 100,
            cleanup_partial_entries: true,
        }))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_console_command(" grant "), ConsoleCommand::Grant);
        assert_eq!(
            parse_console_command("set max_file_size_mb 5"),
            ConsoleCommand::SetMaxFileSize(5)
        );
        assert_eq!(
            parse_console_command("set cleanup_partial_entries false"),
            ConsoleCommand::SetCleanup(false)
        );
        assert!(matches!(
            parse_console_command("set max_file_size_mb 0"),
            ConsoleCommand::Unknown(_)
        ));
        assert!(matches!(parse_console_command("launch"), ConsoleCommand::Unknown(_)));
    }

    #[test]
    fn refuses_file_size_beyond_limit() {
        assert!(matches!(
            parse_console_command("set max_file_size_mb 18000000000000"),
            ConsoleCommand::Unknown(_)
        ));
        assert_eq!(
            parse_console_command(&format!("set max_file_size_mb {}", MAX_FILE_SIZE_MB_LIMIT)),
            ConsoleCommand::SetMaxFileSize(MAX_FILE_SIZE_MB_LIMIT)
        );
    }

    #[tokio::test]
    async fn grant_answers_pending_request() {
        let gate = ConsentGate::new();
        let runtime = runtime();
        gate.request_consent();

        apply_console_command(ConsoleCommand::Grant, &gate, &runtime).await;
        assert_eq!(gate.state(), ConsentState::Granted);
        assert!(gate.is_granted());
    }

    #[tokio::test]
    async fn set_commands_update_runtime_config() {
        let gate = ConsentGate::new();
        let runtime = runtime();

        apply_console_command(ConsoleCommand::SetMaxFileSize(7), &gate, &runtime).await;
        apply_console_command(ConsoleCommand::SetCleanup(false), &gate, &runtime).await;

        let current = runtime.read().await;
        assert_eq!(current.max_file_size_mb, 7);
        assert!(!current.cleanup_partial_entries);
    }
}
