use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Adding two amounts of the same denomination overflowed
    #[error("Amount overflow for denom {denom}: {left} + {right}")]
    AmountOverflow {
        /// Denomination being summed
        denom: String,
        /// Amount already held
        left: i64,
        /// Amount being added
        right: i64,
    },

    /// A coin denomination is empty or contains illegal characters
    #[error("Invalid denomination: {0:?}")]
    InvalidDenom(String),
}
