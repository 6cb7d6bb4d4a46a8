use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] yojana_core::Error),
}
