// Library surface for the binary and for headless/integration tests.
pub mod capture;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod passage;
pub mod report;
pub mod runtime;
pub mod scorer;
pub mod selector;
pub mod session;
pub mod speed;

pub use error::{ConfigError, DictionaryError, Result, TyperError};
