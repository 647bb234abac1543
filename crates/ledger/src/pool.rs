//! Block Fee Pool
//!
//! Fees staged by transactions in the current block and the committed
//! total read by reward distribution at end of block.

use crate::{Error, Result};
use chainfee_core::{Fee, TxId};
use indexmap::IndexMap;
use tracing::{debug, error};

/// Block-scoped fee ledger.
///
/// `pending` maps a transaction to the fee it staged; re-staging overwrites.
/// `committed` only ever grows by additive merge until [`BlockFeePool::clear`].
/// Mutated in place on the sequential block execution path, no locking.
#[derive(Debug, Default)]
pub struct BlockFeePool {
    pending: IndexMap<TxId, Fee>,
    committed: Fee,
}

impl BlockFeePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `fee` for `tx_id`, replacing any earlier entry.
    pub fn add_fee(&mut self, tx_id: impl Into<TxId>, fee: Fee) {
        let tx_id = tx_id.into();
        debug!(tx = %tx_id, fee = %fee, "staging fee");
        self.pending.insert(tx_id, fee);
    }

    /// Stages `fee` and folds it into the committed total at once.
    ///
    /// For fees that must be accounted whatever happens to the rest of the
    /// block, e.g. matching-engine or slashing fees.
    pub fn add_and_commit_fee(&mut self, tx_id: impl Into<TxId>, fee: Fee) -> Result<()> {
        self.committed.add_fee(&fee)?;
        self.add_fee(tx_id, fee);
        Ok(())
    }

    /// Folds the fee staged for `tx_id` into the committed total.
    ///
    /// A missing entry is a bookkeeping defect in the caller and is fatal.
    pub fn commit_fee(&mut self, tx_id: &TxId) -> Result<()> {
        let fee = match self.pending.get(tx_id) {
            Some(fee) => fee,
            None => {
                error!(tx = %tx_id, "commit of a fee that was never staged");
                return Err(Error::CommitWithoutPending(tx_id.clone()));
            }
        };
        self.committed.add_fee(fee)?;
        Ok(())
    }

    /// Removes the fee staged for `tx_id` without committing it.
    pub fn discard_fee(&mut self, tx_id: &TxId) -> Option<Fee> {
        let fee = self.pending.shift_remove(tx_id);
        if fee.is_some() {
            debug!(tx = %tx_id, "discarded staged fee");
        }
        fee
    }

    /// Snapshot of the committed total.
    pub fn block_fees(&self) -> Fee {
        self.committed.clone()
    }

    /// Staged fee for `tx_id`; `None` means nothing was staged, which is
    /// distinct from a staged free fee.
    pub fn get_fee(&self, tx_id: &TxId) -> Option<&Fee> {
        self.pending.get(tx_id)
    }

    /// Resets pending entries and the committed total.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.committed = Fee::free();
    }

    /// Number of staged entries
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Checks if nothing is staged or committed
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.committed.is_empty()
    }
}
