//! Chainfee Ledger Module
//!
//! Block-scoped fee accounting.
//!
//! ## Components
//!
//! - **BlockFeePool**: pending per-transaction fees and the committed block total
//! - **Distribution**: end-of-block crediting of the proposer or all voters

pub mod distribution;
pub mod pool;

pub use distribution::{
    distribute_fee, AccountAddress, BlockContext, BlockFeeRecord, FeeRecipientLedger,
    MemoryFeeLedger, PayoutPlan,
};
pub use pool::BlockFeePool;

use chainfee_core::{CoreError, TxId};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger-specific error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A commit referenced a transaction that never staged a fee
    #[error("Commit without pending fee for tx {0}")]
    CommitWithoutPending(TxId),

    /// Fee arithmetic failed
    #[error("Fee accounting error: {0}")]
    Accounting(#[from] CoreError),

    /// The account store refused a credit
    #[error("Fee distribution failed: {0}")]
    Distribution(String),
}

impl Error {
    /// Whether the error means block processing cannot continue.
    ///
    /// Accounting errors indicate a bookkeeping defect, never bad user input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CommitWithoutPending(_) | Error::Accounting(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::CommitWithoutPending(TxId::new("tx1")).is_fatal());
        assert!(Error::Accounting(CoreError::InvalidDenom(String::new())).is_fatal());
        assert!(!Error::Distribution("store offline".to_string()).is_fatal());
    }
}
