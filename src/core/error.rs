use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    PipelineMalformed,
    SerialUnsupportedOperation,

    RunnerNotFound,
    ExecutionFailed,

    InternalIoError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::PipelineMalformed => "pipeline.malformed",
            ErrorCode::SerialUnsupportedOperation => "serial.unsupported_operation",

            ErrorCode::RunnerNotFound => "runner.not_found",
            ErrorCode::ExecutionFailed => "execution.failed",

            ErrorCode::InternalIoError => "internal.io_error",
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMalformedDetails {
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedOperationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    pub supported: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerNotFoundDetails {
    pub binary: String,
    pub tried: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFailedDetails {
    pub program: String,
    pub args: Vec<String>,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
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
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn pipeline_malformed(problem: impl Into<String>, path: Option<String>) -> Self {
        let problem = problem.into();
        let message = match &path {
            Some(p) => format!("Malformed pipeline '{}': {}", p, problem),
            None => format!("Malformed pipeline: {}", problem),
        };
        let details = to_details(PipelineMalformedDetails { problem, path });

        Self::new(ErrorCode::PipelineMalformed, message, details)
    }

    pub fn serial_unsupported_operation(verb: Option<String>) -> Self {
        let message = match &verb {
            Some(v) => format!("Only 'run' is supported in serial mode, got '{}'", v),
            None => "Only 'run' is supported in serial mode, got no arguments".to_string(),
        };
        let details = to_details(UnsupportedOperationDetails {
            verb,
            supported: vec!["run".to_string()],
        });

        Self::new(ErrorCode::SerialUnsupportedOperation, message, details)
            .with_hint("Disable serial mode to use other bashful verbs")
    }

    pub fn runner_not_found(binary: impl Into<String>, tried: Vec<String>) -> Self {
        let binary = binary.into();
        let details = to_details(RunnerNotFoundDetails {
            binary: binary.clone(),
            tried,
        });

        Self::new(
            ErrorCode::RunnerNotFound,
            format!("Pipeline executor '{}' not found", binary),
            details,
        )
        .with_hint(format!(
            "Install '{}' on PATH or in the third-party directory",
            binary
        ))
        .with_hint("Or re-run with --serial to execute the pipeline as a bash script")
    }

    pub fn execution_failed(
        program: impl Into<String>,
        args: Vec<String>,
        exit_code: Option<i32>,
    ) -> Self {
        let program = program.into();
        let message = match exit_code {
            Some(code) => format!("'{}' exited with status {}", program, code),
            None => format!("'{}' was terminated by a signal", program),
        };
        let details = to_details(ExecutionFailedDetails {
            program,
            args,
            exit_code,
        });

        Self::new(ErrorCode::ExecutionFailed, message, details)
    }

    /// Exit code carried by an `execution.failed` error, if any.
    pub fn exit_code(&self) -> Option<i32> {
        if self.code != ErrorCode::ExecutionFailed {
            return None;
        }
        self.details
            .get("exitCode")
            .and_then(Value::as_i64)
            .map(|code| code as i32)
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
    fn execution_failed_keeps_exit_code() {
        let err = Error::execution_failed("bash", vec!["p.yml.serial.sh".to_string()], Some(3));
        assert_eq!(err.code.as_str(), "execution.failed");
        assert_eq!(err.exit_code(), Some(3));
        assert!(err.message.contains("status 3"));
    }

    #[test]
    fn execution_failed_by_signal_has_no_exit_code() {
        let err = Error::execution_failed("bash", Vec::new(), None);
        assert_eq!(err.exit_code(), None);
        assert!(err.message.contains("signal"));
    }

    #[test]
    fn exit_code_only_reported_for_execution_failures() {
        let err = Error::internal_unexpected("boom");
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn unsupported_operation_names_the_verb() {
        let err = Error::serial_unsupported_operation(Some("list".to_string()));
        assert_eq!(err.code, ErrorCode::SerialUnsupportedOperation);
        assert!(err.message.contains("'list'"));
        assert_eq!(err.details["verb"], "list");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn pipeline_malformed_includes_path() {
        let err = Error::pipeline_malformed("missing 'tasks'", Some("ci.yml".to_string()));
        assert_eq!(err.code.as_str(), "pipeline.malformed");
        assert!(err.message.contains("ci.yml"));
        assert_eq!(err.details["problem"], "missing 'tasks'");
        assert!(err.hints.is_empty());
    }
}
