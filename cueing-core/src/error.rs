use thiserror::Error;

/// Errors raised while constructing core values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("rotation must be one of 0, 90, 180, 270 degrees (got {0})")]
    InvalidRotation(u16),
    #[error("participant name is required")]
    MissingParticipant,
    #[error("a condition must be selected")]
    MissingCondition,
    #[error("participant name must use latin letters only (got `{0}`)")]
    NonAlphabeticParticipant(String),
}
