use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] yojana_core::Error),

    #[error(transparent)]
    Storage(#[from] yojana_storage::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl Error {
    /// The underlying scheme-resolution error, if this is one
    pub fn as_core(&self) -> Option<&yojana_core::Error> {
        match self {
            Error::Core(e) => Some(e),
            Error::Storage(yojana_storage::Error::Core(e)) => Some(e),
            _ => None,
        }
    }
}
