/// Errors produced by the `bridge-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// An email address was empty or not syntactically valid.
    #[error("invalid email address '{value}'")]
    InvalidEmail { value: String },

    /// A credit amount was negative or not a finite number.
    #[error("invalid credit amount {value}: must be finite and non-negative")]
    InvalidCredit { value: f64 },
}
