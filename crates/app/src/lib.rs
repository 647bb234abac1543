//! Chainfee application layer.
//!
//! [`FeeApp`] runs each transaction through the dispatch and charge cycle:
//!
//! 1. **Route** every message; an unknown type rejects the transaction.
//! 2. **Price** every message with its fee calculator and sum the fees.
//! 3. **Charge** by staging the fee in the block fee pool.
//! 4. **Execute** the handlers in message order.
//!
//! At end of block the charged fees are committed, distributed and cleared.

pub mod app;
pub mod error;

pub use app::{FeeApp, TxResponse};
pub use error::{AppError, FeeDisposition, Result};
