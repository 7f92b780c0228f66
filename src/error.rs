use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TyperError>;

/// Rejected settings, caught before any word is selected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--amount = 0, empty test generated")]
    ZeroAmount,

    #[error("--top = 0 no words selected for test")]
    ZeroTop,

    #[error("--min-length must be less than --max-length (got {min} > {max})")]
    LengthRange { min: usize, max: usize },
}

/// The dictionary could not be turned into a word list.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("provided --dictionary = \"{}\", does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("could not read file \"{}\": {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TyperError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error("input error: {0}")]
    Io(#[from] io::Error),

    #[error("test aborted")]
    Aborted,
}

impl TyperError {
    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            TyperError::Aborted => 130,
            _ => 1,
        }
    }
}
