use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for karmadb operations.
///
/// This is a closed set: every failure the data layer can surface falls into
/// exactly one of these categories, and callers dispatch on [`StoreError::kind`]
/// rather than on the structure of the error value.
///
/// # Examples
///
/// ```rust,ignore
/// use karmadb::errors::{ErrorKind, StoreError, StoreResult};
///
/// fn example() -> StoreResult<()> {
///     Err(StoreError::new("store is closed", ErrorKind::Datastore))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Malformed input rejected before any datastore operation was issued
    Validation,
    /// The addressed resource does not exist in the store.
    ///
    /// Empty query results are not errors; lookups report them as an absent
    /// value. This kind covers store-level faults such as addressing an
    /// unknown collection under strict bootstrap.
    NotFound,
    /// A uniqueness constraint rejected a write
    Conflict,
    /// Any other datastore failure (I/O, closed store, serialization)
    Datastore,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "Validation error"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::Conflict => write!(f, "Conflict"),
            ErrorKind::Datastore => write!(f, "Datastore error"),
        }
    }
}

/// Custom karmadb error type.
///
/// `StoreError` carries the error message, its [`ErrorKind`], and an optional
/// cause, supporting error chaining and backtraces for debugging. Failures
/// from the datastore are propagated verbatim; this layer never retries and
/// never swallows an error.
#[derive(Clone)]
pub struct StoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StoreError>>,
    backtrace: Arc<Backtrace>,
}

impl StoreError {
    /// Creates a new `StoreError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `StoreError` with a cause error.
    ///
    /// The cause is preserved in the error chain and reported through
    /// [`Error::source`].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StoreError) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StoreError> {
        self.cause.as_deref()
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for karmadb operations.
///
/// `StoreResult<T>` is shorthand for `Result<T, StoreError>`. All fallible
/// operations in this crate return this type.
pub type StoreResult<T> = Result<T, StoreError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::new(&format!("IO error: {}", err), ErrorKind::Datastore)
    }
}

impl From<std::fmt::Error> for StoreError {
    fn from(err: std::fmt::Error) -> Self {
        StoreError::new(&format!("Formatting error: {}", err), ErrorKind::Datastore)
    }
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::new(&msg, ErrorKind::Datastore)
    }
}

impl From<&str> for StoreError {
    fn from(msg: &str) -> Self {
        StoreError::new(msg, ErrorKind::Datastore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_new_creates_error() {
        let error = StoreError::new("An error occurred", ErrorKind::Datastore);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::Datastore);
        assert!(error.cause.is_none());
    }

    #[test]
    fn store_error_new_with_cause_creates_error() {
        let cause = StoreError::new("root failure", ErrorKind::Datastore);
        let error = StoreError::new_with_cause("An error occurred", ErrorKind::Conflict, cause);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::Conflict);
        assert!(error.cause.is_some());
    }

    #[test]
    fn store_error_message_returns_message() {
        let error = StoreError::new("An error occurred", ErrorKind::Validation);
        assert_eq!(error.message(), "An error occurred");
    }

    #[test]
    fn store_error_kind_returns_kind() {
        let error = StoreError::new("An error occurred", ErrorKind::Validation);
        assert_eq!(error.kind(), &ErrorKind::Validation);
    }

    #[test]
    fn store_error_cause_returns_cause() {
        let cause = StoreError::new("root failure", ErrorKind::Datastore);
        let error = StoreError::new_with_cause("An error occurred", ErrorKind::Datastore, cause);
        assert!(error.cause().is_some());
        assert_eq!(error.cause().unwrap().message(), "root failure");
    }

    #[test]
    fn store_error_cause_returns_none_when_no_cause() {
        let error = StoreError::new("An error occurred", ErrorKind::NotFound);
        assert!(error.cause().is_none());
    }

    #[test]
    fn store_error_display_formats_correctly() {
        let error = StoreError::new("An error occurred", ErrorKind::Datastore);
        assert_eq!(format!("{}", error), "An error occurred");
    }

    #[test]
    fn store_error_debug_formats_with_cause() {
        let cause = StoreError::new("root failure", ErrorKind::Datastore);
        let error = StoreError::new_with_cause("An error occurred", ErrorKind::Datastore, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("An error occurred"));
        assert!(formatted.contains("Caused by"));
    }

    #[test]
    fn store_error_source_exposes_cause() {
        let cause = StoreError::new("root failure", ErrorKind::Conflict);
        let error = StoreError::new_with_cause("outer", ErrorKind::Datastore, cause);
        let source = error.source().expect("source should be present");
        assert_eq!(source.to_string(), "root failure");
    }

    #[test]
    fn error_kind_display_is_stable() {
        assert_eq!(format!("{}", ErrorKind::Validation), "Validation error");
        assert_eq!(format!("{}", ErrorKind::NotFound), "Not found");
        assert_eq!(format!("{}", ErrorKind::Conflict), "Conflict");
        assert_eq!(format!("{}", ErrorKind::Datastore), "Datastore error");
    }

    #[test]
    fn from_io_error_maps_to_datastore_kind() {
        let io_err = std::io::Error::other("disk gone");
        let error: StoreError = io_err.into();
        assert_eq!(error.kind(), &ErrorKind::Datastore);
        assert!(error.message().contains("disk gone"));
    }
}
