use thiserror::Error;

/// Failure of the external language-understanding service.
///
/// These never reach the caller of a turn: the interpreter logs them and
/// falls back to rule extraction. Calls that outlive the configured timeout
/// are cancelled by the interpreter and reported as
/// [`yojana_core::Error::ExtractionTimeout`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Language service unavailable: {0}")]
    Unavailable(String),
}
