//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::path::Path;

use serde_json::Value;

use crate::cli::PayloadArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
/// Without a terminal there is nobody to ask, so `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse the request body from `--data` or `--from-file`.
pub fn read_payload(args: &PayloadArgs) -> Result<Value, CliError> {
    match (&args.data, &args.from_file) {
        (Some(inline), _) => parse_object(inline, "data"),
        (None, Some(path)) => read_json_file(path),
        (None, None) => Err(CliError::Validation {
            field: "data".into(),
            reason: "pass --data or --from-file".into(),
        }),
    }
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    parse_object(&contents, "from-file")
}

fn parse_object(raw: &str, field: &str) -> Result<Value, CliError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON: {e}"),
    })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: field.into(),
            reason: "expected a JSON object".into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inline_payload_must_be_an_object() {
        let args = PayloadArgs {
            data: Some(r#"{"name": "Falcons"}"#.into()),
            from_file: None,
        };
        assert_eq!(read_payload(&args).unwrap(), json!({"name": "Falcons"}));

        let args = PayloadArgs {
            data: Some("[1, 2]".into()),
            from_file: None,
        };
        assert!(matches!(read_payload(&args), Err(CliError::Validation { .. })));
    }

    #[test]
    fn payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        std::fs::write(&path, r#"{"name": "Owls"}"#).unwrap();

        let args = PayloadArgs {
            data: None,
            from_file: Some(path),
        };
        assert_eq!(read_payload(&args).unwrap()["name"], "Owls");
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm("Delete?", "delete", true).unwrap());
    }
}
