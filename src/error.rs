use thiserror::Error;

/// Result type alias for element operations
pub type Result<T> = std::result::Result<T, FxError>;

/// Failure reported by an [`EffectEngine`](crate::engine::EffectEngine) for a single command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine rejected command {code}: {reason}")]
pub struct EngineError {
    pub code: u32,
    pub reason: String,
}

impl EngineError {
    pub fn new(code: u32, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("invalid value for '{property}': {reason}")]
    InvalidValue {
        property: &'static str,
        reason: String,
    },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("property '{property}' expects a {expected} value")]
    TypeMismatch {
        property: &'static str,
        expected: &'static str,
    },

    #[error("unsupported stream format: {0}")]
    UnsupportedFormat(String),

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine has not been configured for a stream")]
    NotConfigured,

    #[error("buffer of {len} bytes is not a whole number of stereo f32 frames")]
    MalformedBuffer { len: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl FxError {
    /// Whether the media pipeline keeps running after this error.
    ///
    /// Rejected property writes are logged and the last good state stays active;
    /// everything else fails the stream.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidValue { .. } | Self::UnknownProperty(_) | Self::TypeMismatch { .. }
        )
    }

    pub(crate) fn invalid(property: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            property,
            reason: reason.into(),
        }
    }
}
