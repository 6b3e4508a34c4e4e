use thiserror::Error;

/// A convenience `Result` alias using [`TutorError`].
pub type TutorResult<T> = Result<T, TutorError>;

/// Top-level error type for the Tutor session engine.
///
/// The session store has exactly two domain failure kinds — rejected input and
/// unknown ids — both of which are expected outcomes rather than faults. The
/// remaining variants cover the configuration and I/O surface of the CLI layer.
#[derive(Error, Debug)]
pub enum TutorError {
    /// Input rejected before any state change (e.g. empty message text).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A session or document id that references nothing in the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
