use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Problems caught locally, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload PNG, JPG, or DICOM files")]
    InvalidFileType { extension: Option<String> },
    #[error("File must be under 50MB")]
    FileTooLarge { size: u64 },
    #[error("Please select a file to upload")]
    NoFileSelected,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Your session has expired. Please sign in again.")]
    Unauthorized,
    #[error("Analysis is still in progress")]
    NotReady,
    #[error("Analysis failed. Please try uploading the image again.")]
    AnalysisFailed,
    #[error("{message}")]
    BackendRejected { status: u16, message: String },
    #[error("Server error: {0}")]
    Server(u16),
    #[error("Upload failed")]
    UploadFailed,
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Pulls the human-readable `detail` out of a backend error body.
///
/// FastAPI reports either a plain string or, for request validation failures,
/// a list of objects carrying a `msg` field.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(message) if !message.trim().is_empty() => Some(message),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

impl ClientError {
    /// Maps a non-success HTTP response onto the error taxonomy.
    ///
    /// 401 is always `Unauthorized` here; callers decide whether a session
    /// has to be torn down (see `SessionContext::reject`).
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return ClientError::Unauthorized;
        }
        match extract_detail(body) {
            Some(message) => ClientError::BackendRejected { status, message },
            None if status >= 500 => ClientError::Server(status),
            None => ClientError::BackendRejected {
                status,
                message: format!("Request failed with status {}", status),
            },
        }
    }

    /// Whether the poll loop may try again after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Decode(_) | ClientError::Server(_) => true,
            ClientError::BackendRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Error shown for a failed upload: the backend's own message when it sent one.
    pub fn into_upload_error(self) -> Self {
        match self {
            ClientError::BackendRejected { .. }
            | ClientError::Unauthorized
            | ClientError::Validation(_) => self,
            _ => ClientError::UploadFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Analysis timed out after {attempts} attempts. Please check your history later.")]
    TimedOut { attempts: u32 },
    #[error("Unable to reach the analysis service: {0}")]
    GaveUp(ClientError),
    #[error("{0}")]
    Rejected(ClientError),
    #[error("Polling already finished")]
    AlreadyFinished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let err = ClientError::from_response(400, r#"{"detail":"Email already registered"}"#);
        assert_eq!(
            err,
            ClientError::BackendRejected {
                status: 400,
                message: "Email already registered".into()
            }
        );
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn test_list_detail_is_joined() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"},{"msg":"field required"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn test_unauthorized_ignores_body() {
        assert_eq!(
            ClientError::from_response(401, r#"{"detail":"Could not validate credentials"}"#),
            ClientError::Unauthorized
        );
    }

    #[test]
    fn test_server_error_without_detail() {
        let err = ClientError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err, ClientError::Server(502));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_upload_error_keeps_backend_message() {
        let err = ClientError::from_response(500, r#"{"detail":"AI processing failed: bad image"}"#);
        assert_eq!(err.clone().into_upload_error(), err);
        assert_eq!(
            ClientError::Transport("offline".into()).into_upload_error(),
            ClientError::UploadFailed
        );
        assert_eq!(ClientError::Server(500).into_upload_error(), ClientError::UploadFailed);
    }

    #[test]
    fn test_client_rejections_are_terminal() {
        assert!(!ClientError::Unauthorized.is_retryable());
        assert!(!ClientError::from_response(404, r#"{"detail":"Upload not found"}"#).is_retryable());
        assert!(!ClientError::AnalysisFailed.is_retryable());
    }
}
