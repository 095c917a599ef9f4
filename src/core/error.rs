use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    ArtifactNotFound,
    ArtifactWriteConflict,
    ArtifactWriteFailed,

    BackupCreateFailed,

    CloneTraversalLimit,

    RemoteRequestFailed,
    RemoteInvalidResponse,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::ArtifactNotFound => "artifact.not_found",
            ErrorCode::ArtifactWriteConflict => "artifact.write_conflict",
            ErrorCode::ArtifactWriteFailed => "artifact.write_failed",

            ErrorCode::BackupCreateFailed => "backup.create_failed",

            ErrorCode::CloneTraversalLimit => "clone.traversal_limit",

            ErrorCode::RemoteRequestFailed => "remote.request_failed",
            ErrorCode::RemoteInvalidResponse => "remote.invalid_response",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDetails {
    pub id: String,
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCreateFailedDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalLimitDetails {
    pub root: String,
    pub limit: usize,
    pub enqueued: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRequestFailedDetails {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn artifact_not_found(id: impl Into<String>, store: impl Into<String>) -> Self {
        let id = id.into();
        let details = to_details(ArtifactDetails {
            id: id.clone(),
            store: store.into(),
            error: None,
        });

        Self::new(
            ErrorCode::ArtifactNotFound,
            format!("Artifact '{}' not found", id),
            details,
        )
        .with_hint("Check the dashboard name and the source location")
    }

    pub fn artifact_write_conflict(id: impl Into<String>, store: impl Into<String>) -> Self {
        let id = id.into();
        let details = to_details(ArtifactDetails {
            id: id.clone(),
            store: store.into(),
            error: None,
        });

        Self::new(
            ErrorCode::ArtifactWriteConflict,
            format!("Artifact '{}' already exists in target", id),
            details,
        )
        .with_hint("Pass --overwrite to replace existing artifacts")
    }

    pub fn artifact_write_failed(
        id: impl Into<String>,
        store: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let details = to_details(ArtifactDetails {
            id: id.clone(),
            store: store.into(),
            error: Some(error.into()),
        });

        Self::new(
            ErrorCode::ArtifactWriteFailed,
            format!("Failed to write artifact '{}'", id),
            details,
        )
    }

    pub fn backup_create_failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(BackupCreateFailedDetails {
            path: path.into(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::BackupCreateFailed,
            "Failed to create backup directory",
            details,
        )
        .with_hint("Pass --no-backup to skip the backup stage")
    }

    pub fn clone_traversal_limit(root: impl Into<String>, limit: usize, enqueued: usize) -> Self {
        let details = to_details(TraversalLimitDetails {
            root: root.into(),
            limit,
            enqueued,
        });

        Self::new(
            ErrorCode::CloneTraversalLimit,
            format!(
                "Traversal processed {} documents without finishing; the reference graph likely contains a cycle",
                limit
            ),
            details,
        )
        .with_hint("Drop --legacy-traversal to process each artifact once")
    }

    pub fn remote_request_failed(
        url: impl Into<String>,
        status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        let details = to_details(RemoteRequestFailedDetails {
            url: url.into(),
            status,
            error: error.into(),
        });

        let mut err = Self::new(
            ErrorCode::RemoteRequestFailed,
            "Remote request failed",
            details,
        );
        err.retryable = Some(status.map_or(true, |s| s >= 500));
        err
    }

    pub fn remote_invalid_response(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RemoteInvalidResponse,
            "Remote returned an invalid response",
            serde_json::json!({ "url": url.into(), "error": error.into() }),
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_id_and_store() {
        let err = Error::artifact_not_found("prod_report_1", "dir:./searches");
        assert_eq!(err.code.as_str(), "artifact.not_found");
        assert_eq!(err.details["id"], "prod_report_1");
        assert_eq!(err.details["store"], "dir:./searches");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn write_failed_records_cause() {
        let err = Error::artifact_write_failed("dev_x", "dir:out", "permission denied");
        assert_eq!(err.details["error"], "permission denied");
    }

    #[test]
    fn invalid_argument_details_omit_missing_id() {
        let err = Error::validation_invalid_argument("max_documents", "Must be at least 1", None);
        assert_eq!(err.details["field"], "max_documents");
        assert_eq!(err.details["problem"], "Must be at least 1");
        assert_eq!(
            err.details.as_object().map(|d| d.len()),
            Some(2)
        );
    }

    #[test]
    fn remote_server_errors_are_retryable() {
        assert_eq!(
            Error::remote_request_failed("http://x", Some(503), "boom").retryable,
            Some(true)
        );
        assert_eq!(
            Error::remote_request_failed("http://x", Some(400), "bad").retryable,
            Some(false)
        );
    }
}
