//! Domain error types.

/// Top-level error type for crosstrader.
#[derive(Debug, thiserror::Error)]
pub enum CrosstraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid strategy parameter {field}: {reason}")]
    InvalidParams { field: String, reason: String },

    #[error("malformed state snapshot: {reason}")]
    Snapshot { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("execution error: {reason}")]
    Execution { reason: String },

    #[error("state is locked by another run: {path} (delete it if no run is active)")]
    StateLocked { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CrosstraderError> for std::process::ExitCode {
    fn from(err: &CrosstraderError) -> Self {
        let code: u8 = match err {
            CrosstraderError::Io(_) => 1,
            CrosstraderError::ConfigParse { .. }
            | CrosstraderError::ConfigMissing { .. }
            | CrosstraderError::ConfigInvalid { .. }
            | CrosstraderError::InvalidParams { .. } => 2,
            CrosstraderError::Data { .. } => 3,
            CrosstraderError::Snapshot { .. } => 4,
            CrosstraderError::Execution { .. } => 5,
            CrosstraderError::StateLocked { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
