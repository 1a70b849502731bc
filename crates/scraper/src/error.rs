// ABOUTME: Error types for the scraper including the ErrorCode enum and ScrapeError struct.
// ABOUTME: Splits failures into validation and transport classes; missing fields are never errors.

use std::fmt;

/// Error codes representing the different categories of scrape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidId,
    UnknownField,
    InvalidInput,
    Fetch,
    Status,
    Timeout,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidId => "invalid identifier",
            ErrorCode::UnknownField => "unknown field",
            ErrorCode::InvalidInput => "invalid input",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Status => "error status",
            ErrorCode::Timeout => "timeout",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every fallible scraper operation.
#[derive(Debug, thiserror::Error)]
pub struct ScrapeError {
    pub code: ErrorCode,
    /// Identifier, URL or field name the failure concerns.
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "imdb-scraper: {} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    fn new(
        code: ErrorCode,
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidId error.
    pub fn invalid_id(target: impl Into<String>, op: impl Into<String>) -> Self {
        let target = target.into();
        let source = anyhow::anyhow!("must be in the form of 'tt1234567', got '{}'", target);
        Self::new(ErrorCode::InvalidId, target, op, Some(source))
    }

    /// Create an UnknownField error for a record variant.
    pub fn unknown_field(record: &str, field: impl Into<String>, op: impl Into<String>) -> Self {
        let field = field.into();
        let source = anyhow::anyhow!("{} has no field '{}'", record, field);
        Self::new(ErrorCode::UnknownField, field, op, Some(source))
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidInput, target, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, target, op, source)
    }

    /// Create a Status error for a 4xx/5xx response.
    pub fn status(target: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        let source = anyhow::anyhow!("remote responded with status {}", status);
        Self::new(ErrorCode::Status, target, op, Some(source))
    }

    /// Create a Timeout error.
    pub fn timeout(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, target, op, source)
    }

    /// Returns true if this is an InvalidId error.
    pub fn is_invalid_id(&self) -> bool {
        self.code == ErrorCode::InvalidId
    }

    /// Returns true if this is an UnknownField error.
    pub fn is_unknown_field(&self) -> bool {
        self.code == ErrorCode::UnknownField
    }

    /// Returns true if this is a Status error.
    pub fn is_status(&self) -> bool {
        self.code == ErrorCode::Status
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Malformed caller input. Never retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidId | ErrorCode::UnknownField | ErrorCode::InvalidInput
        )
    }

    /// Failure reported by the document fetcher.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::Fetch | ErrorCode::Status | ErrorCode::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_is_validation() {
        let err = ScrapeError::invalid_id("nm123", "Scrape");
        assert!(err.is_invalid_id());
        assert!(err.is_validation());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("nm123"));
    }

    #[test]
    fn status_is_transport() {
        let err = ScrapeError::status("https://www.imdb.com/title/tt0000001/", "Fetch", 503);
        assert!(err.is_status());
        assert!(err.is_transport());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn display_includes_op_and_code() {
        let err = ScrapeError::unknown_field("Title", "director", "Record::get");
        assert_eq!(err.code, ErrorCode::UnknownField);
        let msg = err.to_string();
        assert!(msg.starts_with("imdb-scraper: Record::get director: unknown field"));
    }
}
