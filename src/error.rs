use thiserror::Error;

/// Hard failures raised by the analysis core on malformed input.
///
/// "The market does not qualify today" is never one of these; see
/// [`crate::strategies::daily_entry::Decision`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("invalid risk input: {field} must be positive, got {value}")]
    InvalidRiskInput { field: &'static str, value: f64 },

    #[error("lookback radius must be at least 1")]
    InvalidRadius,

    #[error("bar timestamps must be strictly increasing (violated at index {index})")]
    UnorderedBars { index: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
