//! Error kinds raised while driving the school-management application.
//!
//! Every engine operation returns [`AutomationError`], a three-tag error that
//! the session classifier collapses into a single [`DomainError`] per
//! top-level workflow.

use std::fmt;

/// Failure of a single engine step.
#[derive(Debug, Clone, PartialEq)]
pub enum AutomationError {
    /// A bounded wait expired before its condition held.
    Timeout(String),
    /// An expected element or data row was missing or did not match.
    NotFound(String),
    /// Anything else: transport failures, local I/O, malformed input.
    Other(String),
}

pub type Result<T> = std::result::Result<T, AutomationError>;

impl AutomationError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AutomationError::NotFound(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        AutomationError::Other(msg.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AutomationError::Timeout(_) => ErrorClass::Timeout,
            AutomationError::NotFound(_) => ErrorClass::NotFound,
            AutomationError::Other(_) => ErrorClass::Unanticipated,
        }
    }
}

impl fmt::Display for AutomationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationError::Timeout(e) => write!(f, "Timeout: {}", e),
            AutomationError::NotFound(e) => write!(f, "Not found: {}", e),
            AutomationError::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for AutomationError {}

impl From<std::io::Error> for AutomationError {
    fn from(e: std::io::Error) -> Self {
        AutomationError::Other(format!("I/O: {}", e))
    }
}

impl From<serde_json::Error> for AutomationError {
    fn from(e: serde_json::Error) -> Self {
        AutomationError::Other(format!("JSON: {}", e))
    }
}

/// Tier a failure falls into when a workflow aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Timeout,
    NotFound,
    Unanticipated,
}

impl ErrorClass {
    /// Banner written around the failure in the debug log.
    pub fn banner(&self) -> &'static str {
        match self {
            ErrorClass::Timeout => "******** TIMEOUT ********",
            ErrorClass::NotFound => "***** ELEMENT NOT FOUND *****",
            ErrorClass::Unanticipated => "***** UNEXPECTED ERROR *****",
        }
    }
}

/// Top-level workflow family, used to label a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Import,
    Verify,
    Lock,
    Download,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Import => "import",
            OperationKind::Verify => "verify",
            OperationKind::Lock => "lock",
            OperationKind::Download => "download",
        };
        f.write_str(label)
    }
}

/// The single error a workflow reports to its caller.
///
/// The underlying cause is only written to the debug sink; the message names
/// the operation and the class being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub operation: OperationKind,
    pub class_id: String,
    pub class: ErrorClass,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error class {}", self.operation, self.class_id)
    }
}

impl std::error::Error for DomainError {}
