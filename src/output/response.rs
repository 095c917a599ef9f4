//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use dashclone::error::Hint;
use dashclone::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{self, Write};

    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::ArtifactNotFound => 4,

        ErrorCode::ArtifactWriteConflict | ErrorCode::ArtifactWriteFailed => 5,

        ErrorCode::BackupCreateFailed => 6,

        ErrorCode::CloneTraversalLimit => 7,

        ErrorCode::RemoteRequestFailed | ErrorCode::RemoteInvalidResponse => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_response(&CliResponse::success(data)),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_serializes_code_and_hints() {
        let err = Error::artifact_not_found("prod_report_1", "dir:.");
        let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

        assert!(json.contains("\"code\": \"artifact.not_found\""));
        assert!(json.contains("prod_report_1"));
        assert!(json.contains("\"hints\""));
        assert!(json.contains("\"success\": false"));
    }

    #[test]
    fn fatal_conditions_map_to_distinct_exit_codes() {
        let cases = [
            (Error::artifact_not_found("a", "memory"), 4),
            (Error::artifact_write_conflict("a", "memory"), 5),
            (Error::artifact_write_failed("a", "memory", "denied"), 5),
            (Error::backup_create_failed("temp/x", "exists"), 6),
            (Error::clone_traversal_limit("a", 10, 11), 7),
            (Error::remote_request_failed("http://x", Some(500), "boom"), 20),
            (Error::validation_invalid_argument("dashboard", "bad", None), 2),
        ];

        for (err, expected) in cases {
            let code = err.code;
            let (_value, exit_code) = map_cmd_result_to_json::<serde_json::Value>(Err(err));
            assert_eq!(exit_code, expected, "{}", code.as_str());
        }
    }

    #[test]
    fn success_keeps_command_exit_code() {
        let (value, exit_code) = map_cmd_result_to_json(Ok((serde_json::json!({"ok": 1}), 0)));
        assert_eq!(exit_code, 0);
        assert_eq!(value.unwrap()["ok"], 1);
    }
}
