//! # Chainfee Core
//!
//! Fundamental types shared by every chainfee crate.
//!
//! ## Features
//!
//! - **Coins**: `Coin` and the denomination-sorted `Coins` multiset
//! - **Fees**: `Fee` with its `FeeDistributeType` and additive merge
//! - **Messages**: the `Msg` trait implemented by decoded transaction payloads
//! - **Transactions**: `Tx` and its identifier `TxId`
//! - **Error Handling**: `CoreError` and the crate `Result` alias
//!
//! ## Example
//!
//! ```rust
//! use chainfee_core::{Coin, Coins, Fee, FeeDistributeType};
//!
//! let mut total = Fee::free();
//! let fee = Fee::new(Coins::from_coin(Coin::new("BNB", 10)), FeeDistributeType::ForAll);
//! total.add_fee(&fee).unwrap();
//! total.add_fee(&fee).unwrap();
//! assert_eq!(total.tokens().amount_of("BNB"), 20);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Coin and coin multiset arithmetic
pub mod coin;
/// Core error types
pub mod error;
/// Fee values and their distribution type
pub mod fee;
/// Message trait and transaction container
pub mod msg;

pub use coin::{Coin, Coins};
pub use error::{CoreError, Result};
pub use fee::{Fee, FeeDistributeType};
pub use msg::{Msg, Tx, TxId};
