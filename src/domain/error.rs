//! Domain error types.

/// Top-level error type for pnldesk.
#[derive(Debug, thiserror::Error)]
pub enum PnldeskError {
    /// Input rejected by [`crate::domain::validation`]; carries every
    /// violation, not just the first.
    #[error("validation failed: {}", .messages.join("; "))]
    Validation { messages: Vec<String> },

    #[error("trade not found: {id}")]
    TradeNotFound { id: i64 },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("store query error: {reason}")]
    StoreQuery { reason: String },

    #[error("unknown field {field} in collection {collection}")]
    InvalidField { collection: String, field: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PnldeskError> for std::process::ExitCode {
    fn from(err: &PnldeskError) -> Self {
        let code: u8 = match err {
            PnldeskError::Io(_) => 1,
            PnldeskError::ConfigParse { .. }
            | PnldeskError::ConfigMissing { .. }
            | PnldeskError::ConfigInvalid { .. } => 2,
            PnldeskError::Store { .. } | PnldeskError::StoreQuery { .. } => 3,
            PnldeskError::Validation { .. } | PnldeskError::InvalidField { .. } => 4,
            PnldeskError::TradeNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
