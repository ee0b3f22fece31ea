// src/error.rs
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    Network(reqwest::Error),
    Timeout(String),
    Backend { status: u16, message: String },
    Decode(String),
    Precondition(String),
    ValidationError(String),
    InvalidRole(String),
    Forbidden(String),
    Export(String),
    Io(std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Network(err) => write!(f, "Network Error: {}", err),
            ClientError::Timeout(what) => write!(f, "Timeout: {}", what),
            ClientError::Backend { status, message } => {
                write!(f, "Backend Error ({}): {}", status, message)
            }
            ClientError::Decode(msg) => write!(f, "Decode Error: {}", msg),
            ClientError::Precondition(msg) => write!(f, "Precondition Failed: {}", msg),
            ClientError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ClientError::InvalidRole(role) => write!(f, "Invalid Role: '{}'", role),
            ClientError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ClientError::Export(msg) => write!(f, "Export Error: {}", msg),
            ClientError::Io(err) => write!(f, "IO Error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Network(err) => Some(err),
            ClientError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let target = err
                .url()
                .map(|u| u.path().to_string())
                .unwrap_or_else(|| "request".to_string());
            ClientError::Timeout(target)
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err)
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err)
    }
}

impl From<csv::Error> for ClientError {
    fn from(err: csv::Error) -> Self {
        ClientError::Export(err.to_string())
    }
}

impl ClientError {
    pub fn missing_user_id() -> Self {
        ClientError::Precondition("No authenticated user id available".to_string())
    }

    pub fn not_authenticated() -> Self {
        ClientError::Precondition("No user is signed in".to_string())
    }

    pub fn invalid_role(role: &str) -> Self {
        ClientError::InvalidRole(role.to_string())
    }

    pub fn screen_forbidden(screen: &str) -> Self {
        ClientError::Forbidden(format!("Screen '{}' is not reachable for this user", screen))
    }

    /// Transport-level failures that a later poll may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Timeout(_) | ClientError::Backend { status: 500..=599, .. }
        )
    }

    /// Converts the failure of `operation` into the alert shown to the user.
    pub fn to_alert(&self, operation: &str) -> Alert {
        let detail = match self {
            ClientError::Backend { message, .. } => message.clone(),
            ClientError::Timeout(_) => "The server did not answer in time".to_string(),
            ClientError::Network(_) => "Could not reach the server".to_string(),
            other => other.to_string(),
        };
        Alert::error(format!("Could not {}: {}", operation, detail))
    }
}

// ==================== USER ALERTS ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Success,
    Error,
}

/// A message surfaced to the user instead of propagating a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }
}
