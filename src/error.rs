use thiserror::Error;

/// Host-level failures. Language-level errors travel as `Value::Err` and
/// never unwind; this type covers everything outside the language: source
/// text that does not parse, console I/O, and startup configuration.
#[derive(Debug, Error)]
pub enum LixError {
    /// Source text that does not parse.
    #[error("Read error: {0}")]
    Read(String),

    /// The profile-directory variable needed to locate the prelude is not
    /// set. Fatal at startup.
    #[error("The environment variable {0} was not found.")]
    MissingProfileDir(&'static str),

    /// I/O failure talking to the console.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LixResult<T> = Result<T, LixError>;
