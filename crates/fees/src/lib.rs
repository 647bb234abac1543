//! Chainfee Fees Module
//!
//! Fee policies bound to message types.
//!
//! ## Components
//!
//! - **FeeCalculatorRegistry**: message type -> calculator and generator
//! - **Calculators**: free, fixed and transfer fee policies
//! - **FeeParam**: governance-owned fee parameters and the genesis defaults
//! - **FeeParamHub**: applies parameter changes by regenerating calculators

pub mod calculator;
pub mod hub;
pub mod params;
pub mod registry;

pub use calculator::{
    fixed_fee_calculator, fixed_fee_calculator_gen, free_fee_calculator,
    transfer_fee_calculator, transfer_fee_calculator_gen, FeeCalculator, FeeCalculatorGenerator,
};
pub use hub::FeeParamHub;
pub use params::{
    default_genesis, register_default_generators, register_generators_for, FeeGenesis, FeeParam, FixedFeeParams,
    TransferFeeParams,
};
pub use registry::FeeCalculatorRegistry;

use thiserror::Error;

/// Result type for fee operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fee-specific error types
#[derive(Debug, Error)]
pub enum Error {
    /// A fee parameter failed validation
    #[error("Invalid fee param for {msg_type:?}: {reason}")]
    InvalidFeeParam { msg_type: String, reason: String },

    /// A fee genesis file could not be read
    #[error("Failed to read fee genesis {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Fee genesis text could not be decoded
    #[error("Failed to parse fee genesis: {0}")]
    GenesisParse(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::GenesisParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::GenesisParse(err.to_string())
    }
}
