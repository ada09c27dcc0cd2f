//! Error types for todoshare
//!
//! Every error belongs to one [`ErrorKind`]; the CLI maps kinds to exit codes:
//! - 0: Success
//! - 1: Unexpected failure (storage, IO, serialization)
//! - 2: Validation failed (bad input, bad config)
//! - 3: Not found
//! - 4: Forbidden or insufficient permission
//! - 5: Conflict (duplicate name, duplicate share, self-share)
//! - 6: Timeout or cancellation

use std::path::PathBuf;
use thiserror::Error;

use crate::model::{CategoryId, TaskId, UserId};

/// Exit codes for the todoshare CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED: i32 = 1;
    pub const VALIDATION_FAILED: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const FORBIDDEN: i32 = 4;
    pub const CONFLICT: i32 = 5;
    pub const TIMEOUT: i32 = 6;
}

/// Classification used by callers to pick a transport-level signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InsufficientPermission,
    Conflict,
    ValidationFailed,
    Timeout,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InsufficientPermission => "insufficient_permission",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

/// Main error type for todoshare operations
#[derive(Error, Debug)]
pub enum Error {
    // Not found
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("todo not found: {0}")]
    TaskNotFound(TaskId),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("share not found for user {user_id} on category {category_id}")]
    ShareNotFound {
        category_id: CategoryId,
        user_id: UserId,
    },

    // Forbidden
    #[error("you don't have permission to access category {0}")]
    Forbidden(CategoryId),

    #[error("only the owner can manage category {0}")]
    CategoryForbidden(CategoryId),

    // Insufficient permission
    #[error("you don't have write permission for category {0}")]
    NoWritePermission(CategoryId),

    // Conflicts
    #[error("category with this name already exists: {0}")]
    CategoryNameExists(String),

    #[error("category {category_id} is already shared with user {user_id}")]
    ShareAlreadyExists {
        category_id: CategoryId,
        user_id: UserId,
    },

    #[error("cannot share category with yourself")]
    CannotShareWithSelf,

    #[error("a user with this email already exists: {0}")]
    UserEmailExists(String),

    // Validation
    #[error("category is required (pass a category id or a category name)")]
    CategoryRequired,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("update has no fields to change")]
    NoChanges,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Timeout
    #[error("{operation} timed out")]
    Timeout { operation: String },

    // Unexpected
    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{operation}: {source}")]
    Unexpected {
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CategoryNotFound(_)
            | Error::TaskNotFound(_)
            | Error::UserNotFound(_)
            | Error::ShareNotFound { .. } => ErrorKind::NotFound,

            Error::Forbidden(_) | Error::CategoryForbidden(_) => ErrorKind::Forbidden,

            Error::NoWritePermission(_) => ErrorKind::InsufficientPermission,

            Error::CategoryNameExists(_)
            | Error::ShareAlreadyExists { .. }
            | Error::CannotShareWithSelf
            | Error::UserEmailExists(_) => ErrorKind::Conflict,

            Error::CategoryRequired
            | Error::InvalidArgument(_)
            | Error::NoChanges
            | Error::InvalidConfig(_) => ErrorKind::ValidationFailed,

            Error::Timeout { .. } => ErrorKind::Timeout,

            Error::LockFailed(_)
            | Error::DataIntegrity(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NotFound => exit_codes::NOT_FOUND,
            ErrorKind::Forbidden | ErrorKind::InsufficientPermission => exit_codes::FORBIDDEN,
            ErrorKind::Conflict => exit_codes::CONFLICT,
            ErrorKind::ValidationFailed => exit_codes::VALIDATION_FAILED,
            ErrorKind::Timeout => exit_codes::TIMEOUT,
            ErrorKind::Unexpected => exit_codes::UNEXPECTED,
        }
    }

    /// Structured details for JSON output
    pub fn details(&self) -> Option<serde_json::Value> {
        use serde_json::json;

        match self {
            Error::CategoryNotFound(id)
            | Error::Forbidden(id)
            | Error::CategoryForbidden(id)
            | Error::NoWritePermission(id) => Some(json!({ "category_id": id })),
            Error::TaskNotFound(id) => Some(json!({ "todo_id": id })),
            Error::UserNotFound(email) | Error::UserEmailExists(email) => {
                Some(json!({ "user": email }))
            }
            Error::ShareNotFound {
                category_id,
                user_id,
            }
            | Error::ShareAlreadyExists {
                category_id,
                user_id,
            } => Some(json!({ "category_id": category_id, "user_id": user_id })),
            Error::CategoryNameExists(name) => Some(json!({ "name": name })),
            Error::Timeout { operation } => Some(json!({ "operation": operation })),
            Error::Unexpected { operation, .. } => Some(json!({ "operation": operation })),
            Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::DataIntegrity(message) => Some(json!({ "message": message })),
            Error::LockFailed(path) => Some(json!({ "path": path.display().to_string() })),
            _ => None,
        }
    }

    /// Wrap collaborator failures with the operation name.
    ///
    /// Classified errors (not found, conflicts, timeouts, ...) pass through untouched and an
    /// already wrapped error is never wrapped twice.
    pub fn within(self, operation: &'static str) -> Error {
        match self {
            err @ Error::Unexpected { .. } => err,
            err if err.kind() == ErrorKind::Unexpected => Error::Unexpected {
                operation,
                source: Box::new(err),
            },
            err => err,
        }
    }
}

/// Result type alias for todoshare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Attach an operation name to unexpected failures on the error path.
pub trait ResultExt<T> {
    fn within(self, operation: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn within(self, operation: &'static str) -> Result<T> {
        self.map_err(|err| err.within(operation))
    }
}

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
