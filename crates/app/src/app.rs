//! Fee application context.
//!
//! Owns the route table, the fee calculator registry, the fee parameter hub
//! and the block fee pool, and drives every transaction through
//! route, price, charge and execute.

use crate::error::{AppError, FeeDisposition, Result};
use chainfee_config::{FailedTxFeePolicy, FeeConfig};
use chainfee_core::{Fee, Msg, Tx, TxId};
use chainfee_fees::{
    register_default_generators, register_generators_for, FeeCalculatorRegistry, FeeParam,
    FeeParamHub,
};
use chainfee_ledger::{BlockContext, BlockFeePool, BlockFeeRecord, FeeRecipientLedger, PayoutPlan};
use chainfee_router::{Handler, HandlerOutput, RouteTable};
use indexmap::IndexSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Result of a delivered or simulated transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResponse {
    /// Transaction identifier
    pub tx_id: TxId,
    /// Fee charged (or that would be charged, when simulating)
    pub fee: Fee,
    /// One output per message, in message order
    pub outputs: Vec<HandlerOutput>,
}

/// Application context for one chain, generic over the chain state `S`
/// handed to handlers.
pub struct FeeApp<S> {
    config: FeeConfig,
    router: RouteTable<S>,
    registry: FeeCalculatorRegistry,
    hub: FeeParamHub,
    pool: BlockFeePool,
    /// Transactions charged this block, in delivery order
    charged: IndexSet<TxId>,
    /// Payout of a closed block that stopped on a ledger failure
    payout: Option<PayoutPlan>,
}

impl<S> fmt::Debug for FeeApp<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeeApp")
            .field("config", &self.config)
            .field("router", &self.router)
            .field("registry", &self.registry)
            .field("pool", &self.pool)
            .field("charged", &self.charged.len())
            .field("payout", &self.payout)
            .finish()
    }
}

impl<S> FeeApp<S> {
    /// Builds the context from a finished route table and the genesis fee
    /// parameters. Generators are registered in the configured native
    /// denomination for the default schedule and for every genesis param.
    pub fn new(config: FeeConfig, router: RouteTable<S>, genesis: Vec<FeeParam>) -> Result<Self> {
        let mut registry = FeeCalculatorRegistry::new();
        register_default_generators(&mut registry, &config.native_denom);
        register_generators_for(&mut registry, &genesis, &config.native_denom);
        Self::with_registry(config, router, registry, genesis)
    }

    /// Like [`FeeApp::new`] but with caller-provided generators. Params
    /// without a generator are left unpriced.
    pub fn with_registry(
        config: FeeConfig,
        router: RouteTable<S>,
        mut registry: FeeCalculatorRegistry,
        genesis: Vec<FeeParam>,
    ) -> Result<Self> {
        let hub = FeeParamHub::new(genesis)?;
        let calculators = hub.load(&mut registry)?;
        info!(
            routes = router.len(),
            calculators,
            policy = %config.failed_tx_fee_policy,
            "fee app initialized"
        );

        Ok(Self {
            config,
            router,
            registry,
            hub,
            pool: BlockFeePool::new(),
            charged: IndexSet::new(),
            payout: None,
        })
    }

    /// Fee configuration
    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Route table
    pub fn router(&self) -> &RouteTable<S> {
        &self.router
    }

    /// Fee calculator registry
    pub fn registry(&self) -> &FeeCalculatorRegistry {
        &self.registry
    }

    /// Mutable registry for governance code that installs calculators directly
    pub fn registry_mut(&mut self) -> &mut FeeCalculatorRegistry {
        &mut self.registry
    }

    /// Current fee parameters
    pub fn fee_params(&self) -> &FeeParamHub {
        &self.hub
    }

    /// Block fee pool
    pub fn pool(&self) -> &BlockFeePool {
        &self.pool
    }

    /// Payout left unfinished by a failed [`FeeApp::end_block`]
    pub fn pending_payout(&self) -> Option<&PayoutPlan> {
        self.payout.as_ref()
    }

    /// Fee a transaction would be charged, without routing or executing it.
    ///
    /// Message fees that overflow when summed reject the transaction.
    pub fn price_tx(&self, tx: &Tx) -> Result<Fee> {
        let mut total = Fee::free();
        for msg in tx.msgs() {
            total
                .add_fee(&self.price_msg(msg.as_ref()))
                .map_err(|source| AppError::FeeOverflow {
                    tx: tx.id().clone(),
                    source,
                })?;
        }
        Ok(total)
    }

    fn price_msg(&self, msg: &dyn Msg) -> Fee {
        match self.registry.get_calculator(msg.msg_type()) {
            Some(calculator) => calculator(msg),
            None => Fee::free(),
        }
    }

    /// Delivers a transaction as part of the current block.
    ///
    /// Every message is routed before anything is charged, so an unknown
    /// message type rejects the whole transaction with nothing staged. The
    /// fee is staged before handlers run; if a handler fails the remaining
    /// messages are skipped and the staged fee follows the configured
    /// [`FailedTxFeePolicy`].
    pub fn deliver_tx(&mut self, state: &mut S, tx: &Tx) -> Result<TxResponse> {
        self.ensure_no_pending_payout()?;
        let tx_id = tx.id().clone();
        let handlers = route_all(&self.router, tx)?;
        let fee = self.price_tx(tx)?;

        // Staged even when free, so every charged id has a pending entry.
        self.charged.insert(tx_id.clone());
        self.pool.add_fee(tx_id.clone(), fee.clone());

        let mut outputs = Vec::with_capacity(handlers.len());
        for (index, (handler, msg)) in handlers.into_iter().zip(tx.msgs()).enumerate() {
            match handler.handle(state, msg.as_ref(), false) {
                Ok(output) => outputs.push(output),
                Err(source) => {
                    let disposition = match self.config.failed_tx_fee_policy {
                        FailedTxFeePolicy::Collect => FeeDisposition::Staged,
                        FailedTxFeePolicy::Discard => {
                            self.pool.discard_fee(&tx_id);
                            self.charged.shift_remove(&tx_id);
                            FeeDisposition::Discarded
                        }
                    };
                    warn!(
                        tx = %tx_id,
                        index,
                        msg_type = msg.msg_type(),
                        fee = %disposition,
                        error = %source,
                        "message handler failed"
                    );
                    return Err(AppError::HandlerFailed {
                        tx: tx_id,
                        index,
                        msg_type: msg.msg_type().to_string(),
                        fee: disposition,
                        source,
                    });
                }
            }
        }

        debug!(tx = %tx_id, fee = %fee, msgs = outputs.len(), "delivered tx");
        Ok(TxResponse {
            tx_id,
            fee,
            outputs,
        })
    }

    /// Simulates a transaction: routes, prices and runs every handler with
    /// `simulate = true`. The block fee pool is never touched.
    pub fn check_tx(&self, state: &mut S, tx: &Tx) -> Result<TxResponse> {
        let handlers = route_all(&self.router, tx)?;
        let fee = self.price_tx(tx)?;

        let mut outputs = Vec::with_capacity(handlers.len());
        for (index, (handler, msg)) in handlers.into_iter().zip(tx.msgs()).enumerate() {
            let output = handler
                .handle(state, msg.as_ref(), true)
                .map_err(|source| AppError::HandlerFailed {
                    tx: tx.id().clone(),
                    index,
                    msg_type: msg.msg_type().to_string(),
                    fee: FeeDisposition::NotCharged,
                    source,
                })?;
            outputs.push(output);
        }

        Ok(TxResponse {
            tx_id: tx.id().clone(),
            fee,
            outputs,
        })
    }

    /// Records a fee that does not belong to a delivered transaction, such
    /// as matching-engine or slashing fees. Committed immediately.
    ///
    /// A tag equal to the id of a transaction charged this block is rejected,
    /// since committing it would consume that transaction's staged fee.
    pub fn collect_block_level_fee(&mut self, tag: impl Into<TxId>, fee: Fee) -> Result<()> {
        self.ensure_no_pending_payout()?;
        let tag = tag.into();
        if self.charged.contains(&tag) {
            return Err(AppError::DuplicateFeeKey(tag));
        }
        debug!(tag = %tag, fee = %fee, "collecting block-level fee");
        self.pool.add_and_commit_fee(tag, fee)?;
        Ok(())
    }

    /// Closes the block: commits every charged transaction in delivery
    /// order, distributes the block total and clears the pool.
    ///
    /// A commit failure is fatal and the block has to be discarded. If the
    /// ledger refuses a credit the payout is kept pending: calling
    /// `end_block` again for the same height resumes it, paying only the
    /// recipients that were not credited yet. Until then no transaction or
    /// block-level fee is accepted.
    pub fn end_block<L>(&mut self, ctx: &BlockContext, ledger: &mut L) -> Result<BlockFeeRecord>
    where
        L: FeeRecipientLedger + ?Sized,
    {
        let mut plan = match self.payout.take() {
            Some(plan) if plan.height() != ctx.height => {
                let height = plan.height();
                self.payout = Some(plan);
                return Err(AppError::PayoutPending(height));
            }
            Some(plan) => {
                info!(
                    height = ctx.height,
                    remaining = plan.remaining(),
                    "resuming block fee payout"
                );
                plan
            }
            None => {
                for tx_id in &self.charged {
                    self.pool.commit_fee(tx_id)?;
                }
                let committed = std::mem::take(&mut self.charged).len();
                let fees = self.pool.block_fees();
                info!(height = ctx.height, txs = committed, fee = %fees, "block fees committed");
                PayoutPlan::new(&fees, ctx, self.config.publish_block_fee)?
            }
        };

        match plan.apply(ledger) {
            Ok(record) => {
                self.pool.clear();
                Ok(record)
            }
            Err(err) => {
                warn!(
                    height = ctx.height,
                    remaining = plan.remaining(),
                    error = %err,
                    "block fee payout interrupted"
                );
                self.payout = Some(plan);
                Err(err.into())
            }
        }
    }

    /// Drops every staged and committed fee of the current block, along
    /// with any unfinished payout.
    pub fn discard_block(&mut self) {
        if !self.pool.is_empty() {
            warn!(
                pending = self.pool.pending_len(),
                fee = %self.pool.block_fees(),
                "discarding block fees"
            );
        }
        if let Some(plan) = self.payout.take() {
            warn!(
                height = plan.height(),
                remaining = plan.remaining(),
                "dropping unfinished payout"
            );
        }
        self.pool.clear();
        self.charged.clear();
    }

    /// Applies a governance fee parameter change and rebuilds calculators.
    /// A rejected change leaves the current pricing in place.
    pub fn apply_fee_param_change(&mut self, updates: Vec<FeeParam>) -> Result<usize> {
        for update in &updates {
            update.check()?;
        }
        register_generators_for(&mut self.registry, &updates, &self.config.native_denom);
        Ok(self.hub.update(updates, &mut self.registry)?)
    }

    fn ensure_no_pending_payout(&self) -> Result<()> {
        match &self.payout {
            Some(plan) => Err(AppError::PayoutPending(plan.height())),
            None => Ok(()),
        }
    }
}

/// Resolves a handler for every message before anything is charged.
fn route_all<'a, S>(router: &'a RouteTable<S>, tx: &Tx) -> Result<Vec<&'a dyn Handler<S>>> {
    if tx.msgs().is_empty() {
        return Err(AppError::EmptyTx(tx.id().clone()));
    }
    tx.msgs()
        .iter()
        .map(|msg| {
            router
                .route(msg.route())
                .ok_or_else(|| AppError::RouteNotFound {
                    tx: tx.id().clone(),
                    route: msg.route().to_string(),
                })
        })
        .collect()
}
