//! Shared helpers for command handlers.

use std::io::IsTerminal;

use serde::de::DeserializeOwned;

use crate::cli::PayloadArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Parse the JSON body given inline (`--data`) or by file (`--from-file`).
pub fn read_payload<T: DeserializeOwned>(payload: &PayloadArgs) -> Result<T, CliError> {
    let raw = match (&payload.data, &payload.from_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::Validation {
                field: "payload".into(),
                reason: "pass --data or --from-file".into(),
            });
        }
    };
    Ok(serde_json::from_str(&raw)?)
}
