use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnhanceError {
    #[error("storage write failed for `{key}`: {reason}")]
    Storage { key: String, reason: String },
    #[error("malformed record under `{key}`: {reason}")]
    MalformedRecord { key: String, reason: String },
    #[error("counter target `{raw}` is not a non-negative integer")]
    InvalidCounterTarget { raw: String },
    #[error("cannot parse `{raw}` as a date")]
    InvalidDate { raw: String },
    #[error("number format options: {0}")]
    NumberFormat(String),
    #[error("clipboard: {0}")]
    Clipboard(String),
    #[error("widget library: {0}")]
    Widget(String),
    #[error("dom: {0}")]
    Dom(String),
}

pub type Result<T, E = EnhanceError> = std::result::Result<T, E>;
