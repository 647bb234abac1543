//! Application-level errors.

use chainfee_core::{CoreError, TxId};
use chainfee_router::HandlerError;
use std::fmt;
use thiserror::Error;

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;

/// What happened to the fee of a transaction whose handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeDisposition {
    /// Left staged; it is committed at end of block
    Staged,
    /// Un-staged; the block total never sees it
    Discarded,
    /// Simulation, nothing was staged
    NotCharged,
}

impl fmt::Display for FeeDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeDisposition::Staged => write!(f, "staged"),
            FeeDisposition::Discarded => write!(f, "discarded"),
            FeeDisposition::NotCharged => write!(f, "not charged"),
        }
    }
}

/// Errors raised while dispatching transactions or closing a block.
#[derive(Debug, Error)]
pub enum AppError {
    /// The transaction carries no messages
    #[error("Transaction {0} has no messages")]
    EmptyTx(TxId),

    /// No handler is bound to the message route
    #[error("unknown message type: {route}")]
    RouteNotFound {
        /// Transaction being delivered
        tx: TxId,
        /// Route that missed
        route: String,
    },

    /// A handler rejected a message
    #[error("Message {index} ({msg_type}) of tx {tx} failed, fee {fee}: {source}")]
    HandlerFailed {
        /// Transaction being delivered
        tx: TxId,
        /// Position of the failing message
        index: usize,
        /// Type of the failing message
        msg_type: String,
        /// Outcome for the staged fee
        fee: FeeDisposition,
        /// Handler error
        #[source]
        source: HandlerError,
    },

    /// Summing the message fees of a transaction overflowed
    #[error("Fee of tx {tx} overflows: {source}")]
    FeeOverflow {
        /// Transaction being priced
        tx: TxId,
        /// Arithmetic error
        #[source]
        source: CoreError,
    },

    /// A block-level fee tag is already used by a charged transaction
    #[error("Fee key {0} is already charged in this block")]
    DuplicateFeeKey(TxId),

    /// The payout of a closed block has not completed; retry `end_block`
    /// for that height first
    #[error("Payout of block {0} has not completed")]
    PayoutPending(u64),

    /// Fee arithmetic failed
    #[error(transparent)]
    Accounting(#[from] CoreError),

    /// Block fee pool or distribution error
    #[error(transparent)]
    Ledger(#[from] chainfee_ledger::Error),

    /// Fee parameter change rejected
    #[error(transparent)]
    Fees(#[from] chainfee_fees::Error),
}

impl AppError {
    /// Whether block processing must halt.
    ///
    /// Transaction-level errors and rejected governance updates are not fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Accounting(_) => true,
            AppError::Ledger(err) => err.is_fatal(),
            AppError::EmptyTx(_)
            | AppError::RouteNotFound { .. }
            | AppError::HandlerFailed { .. }
            | AppError::FeeOverflow { .. }
            | AppError::DuplicateFeeKey(_)
            | AppError::PayoutPending(_)
            | AppError::Fees(_) => false,
        }
    }
}
