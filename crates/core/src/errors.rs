use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quantity `{value}` (expected an integer)")]
    InvalidQuantity { value: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
