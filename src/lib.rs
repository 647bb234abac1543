//! # Chainfee: per-block fee accounting and message dispatch
//!
//! The state-transition core that charges every delivered transaction a fee
//! and routes its messages to the handler bound to their type.
//!
//! ## Architecture
//!
//! - [`chainfee_core`] - coins, fees, messages and transactions
//! - [`chainfee_config`] - TOML configuration
//! - [`chainfee_fees`] - fee calculators, their registry and governance parameters
//! - [`chainfee_ledger`] - the block fee pool and end-of-block distribution
//! - [`chainfee_router`] - the message route table and handler contract
//! - [`chainfee_app`] - the dispatch and charge cycle tying them together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chainfee::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("chainfee.toml")?;
//!     chainfee::init_logging(&config.logging)?;
//!
//!     let mut router = RouteTable::<u64>::new();
//!     router.register("send", |height: &mut u64, _: &dyn Msg, _: bool| -> Result<_, HandlerError> {
//!         *height += 1;
//!         Ok(HandlerOutput::default())
//!     })?;
//!
//!     let app = chainfee::bootstrap(&config, router, default_genesis())?;
//!     assert!(app.pool().is_empty());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use chainfee_app as app;
pub use chainfee_config as config;
pub use chainfee_core as primitives;
pub use chainfee_fees as fees;
pub use chainfee_ledger as ledger;
pub use chainfee_router as router;

use chainfee_app::{AppError, FeeApp};
use chainfee_config::{AppConfig, ConfigError, LoggingConfig};
use chainfee_fees::FeeParam;
use chainfee_router::RouteTable;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Common imports for embedding chainfee
pub mod prelude {
    pub use crate::app::{AppError, FeeApp, FeeDisposition, TxResponse};
    pub use crate::config::{AppConfig, FailedTxFeePolicy, FeeConfig, LoggingConfig};
    pub use crate::primitives::{Coin, Coins, Fee, FeeDistributeType, Msg, Tx, TxId};
    pub use crate::fees::{
        default_genesis, FeeCalculatorRegistry, FeeGenesis, FeeParam, FixedFeeParams,
        TransferFeeParams,
    };
    pub use crate::ledger::{
        AccountAddress, BlockContext, BlockFeePool, BlockFeeRecord, FeeRecipientLedger,
        MemoryFeeLedger, PayoutPlan,
    };
    pub use crate::router::{Handler, HandlerError, HandlerOutput, RouteTable};
}

/// Top-level errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The application context could not be built
    #[error(transparent)]
    App(#[from] AppError),

    /// The tracing subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for top-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| Error::Logging(format!("invalid filter {:?}: {e}", config.filter)))?,
    };

    let installed = if config.json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init()
    };
    installed.map_err(|e| Error::Logging(e.to_string()))
}

/// Validates `config` and builds the application context.
pub fn bootstrap<S>(
    config: &AppConfig,
    router: RouteTable<S>,
    genesis: Vec<FeeParam>,
) -> Result<FeeApp<S>> {
    config.validate()?;
    let app = FeeApp::new(config.fees.clone(), router, genesis)?;
    info!(
        denom = %config.fees.native_denom,
        routes = app.router().len(),
        "chainfee ready"
    );
    Ok(app)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
