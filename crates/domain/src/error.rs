/// Shared error type used across all ThreadBridge crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("assistant backend: {0}")]
    Backend(String),

    #[error("record sink: {0}")]
    Records(String),

    #[error("connector: {0}")]
    Connector(String),

    #[error("auth: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, Error>;
