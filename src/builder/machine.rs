//! The balancing state machine.
//!
//! A fixed-point loop over five phases (Selection → ChangeCreation →
//! FeeCalculation → Balance → optional Fallback) driving towards
//! `Σinputs = Σoutputs + fee` for lovelace and `Σinputs = Σoutputs` for
//! every native asset. Grounded in the teacher's `TxBuilder::build`
//! (`hose/src/builder/mod.rs`), which already runs an informal version
//! of this loop (select → compute change → recompute fee → loop until
//! no more inputs are needed); here the phases and their transitions are
//! made explicit instead of living inside one `loop { ... }` block.

use tracing::debug;

use crate::builder::coin_selection;
use crate::builder::fee;
use crate::builder::fee::calculate_min_fee;
use crate::builder::operation::TransactionState;
use crate::builder::tx::{BuiltTransaction, StagingTransaction};
use crate::builder::unfrack;
use crate::config::{BuildOptions, OnInsufficientChange, ProtocolParameters};
use crate::error::BalanceError;
use crate::primitives::{Address, AssetBag, TxOutput, Utxo};

/// Bounds the Selection → ChangeCreation → Selection reselection loop.
const MAX_ATTEMPTS: usize = 3;

/// Defensive bound on total phase transitions. The phase loop terminates
/// by the monotone argument in spec §9 (|delta.lovelace| trends to zero
/// once reselection settles); this is a backstop against a future
/// regression turning that into an infinite loop, not a documented part
/// of the algorithm.
const MAX_PHASE_TRANSITIONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Selection,
    ChangeCreation,
    FeeCalculation,
    Balance,
    Fallback,
    Complete,
}

struct BuildContext {
    phase: Phase,
    attempt: usize,
    latest_fee: u64,
    lovelace_shortfall: u64,
    change_outputs: Vec<TxOutput>,
    can_unfrack: bool,
}

impl BuildContext {
    fn new(can_unfrack: bool) -> Self {
        Self {
            phase: Phase::Selection,
            attempt: 0,
            latest_fee: 0,
            lovelace_shortfall: 0,
            change_outputs: Vec::new(),
            can_unfrack,
        }
    }
}

pub struct BalancingMachine<'a> {
    pub pparams: &'a ProtocolParameters,
    pub options: &'a BuildOptions,
    pub change_address: &'a Address,
    pub network_id: u8,
    pub available: Vec<Utxo>,
}

impl<'a> BalancingMachine<'a> {
    fn remaining_pool(&self, state: &TransactionState) -> Vec<Utxo> {
        self.available
            .iter()
            .filter(|utxo| {
                !state
                    .selected_inputs
                    .iter()
                    .any(|selected| selected.tx_hash == utxo.tx_hash && selected.output_index == utxo.output_index)
            })
            .cloned()
            .collect()
    }

    fn staging(&self, state: &TransactionState, ctx: &BuildContext) -> StagingTransaction {
        let mut staging = StagingTransaction::new().network_id(self.network_id);
        for utxo in &state.selected_inputs {
            staging = staging.input(utxo.into());
        }
        for output in state.declared_outputs.iter().chain(ctx.change_outputs.iter()) {
            staging = staging.output(output.clone());
        }
        staging
    }

    /// Runs the phase loop to completion, returning the assembled
    /// transaction together with the computed fee.
    pub fn run(&mut self, state: &mut TransactionState) -> Result<BuiltTransaction, BalanceError> {
        let mut ctx = BuildContext::new(self.options.unfrack.is_some());
        let mut transitions = 0usize;

        loop {
            transitions += 1;
            if transitions > MAX_PHASE_TRANSITIONS {
                return Err(BalanceError::Internal(
                    "balancing machine did not converge within the phase transition bound".into(),
                ));
            }

            debug!(phase = ?ctx.phase, attempt = ctx.attempt, fee = ctx.latest_fee, "balancing phase");

            match ctx.phase {
                Phase::Selection => self.selection(state, &mut ctx)?,
                Phase::ChangeCreation => self.change_creation(state, &mut ctx)?,
                Phase::FeeCalculation => self.fee_calculation(state, &mut ctx)?,
                Phase::Balance => self.balance(state, &mut ctx)?,
                Phase::Fallback => self.fallback(&mut ctx),
                Phase::Complete => return self.complete(state, &ctx),
            }
        }
    }

    fn selection(&self, state: &mut TransactionState, ctx: &mut BuildContext) -> Result<(), BalanceError> {
        let mut need = state.total_output_assets().clone();
        need.set("lovelace", need.lovelace() + ctx.lovelace_shortfall);

        let delta = need.subtract(state.total_input_assets());
        let shortfalls = delta.filter_positive();

        if shortfalls.is_empty() && ctx.lovelace_shortfall == 0 {
            ctx.phase = Phase::ChangeCreation;
            return Ok(());
        }

        let pool = self.remaining_pool(state);
        let picked = coin_selection::select(&self.options.coin_selection, &pool, &shortfalls)?;
        state.push_inputs(picked);
        ctx.attempt += 1;
        ctx.lovelace_shortfall = 0;
        ctx.phase = Phase::ChangeCreation;
        Ok(())
    }

    fn change_creation(&self, state: &mut TransactionState, ctx: &mut BuildContext) -> Result<(), BalanceError> {
        let mut need = state.total_output_assets().clone();
        need.set("lovelace", need.lovelace() + ctx.latest_fee);
        let tentative_leftover = state.total_input_assets().subtract(&need);

        if tentative_leftover.lovelace() < 0 {
            ctx.lovelace_shortfall = (-tentative_leftover.lovelace()) as u64;
            ctx.change_outputs.clear();
            ctx.phase = Phase::Selection;
            return Ok(());
        }

        let leftover = AssetBag::try_from(tentative_leftover)
            .map_err(|_| BalanceError::Internal("negative native asset component in tentative leftover".into()))?;

        let candidate = TxOutput::new(self.change_address.clone(), 0).add_assets(leftover.clone());
        let min_single = candidate.min_deposit(self.pparams)?;

        if leftover.lovelace() < min_single {
            let has_native_assets = leftover.native_units().next().is_some();
            let shortfall = min_single - leftover.lovelace();
            let pool_has_more = !self.remaining_pool(state).is_empty();

            if has_native_assets {
                if ctx.attempt < MAX_ATTEMPTS && pool_has_more {
                    ctx.lovelace_shortfall = shortfall;
                    ctx.phase = Phase::Selection;
                } else {
                    return Err(BalanceError::NativeAssetLocked { shortfall });
                }
                return Ok(());
            }

            if ctx.attempt < MAX_ATTEMPTS && pool_has_more {
                ctx.lovelace_shortfall = shortfall;
                ctx.phase = Phase::Selection;
                return Ok(());
            }

            if self.options.drain_to.is_some() || self.options.on_insufficient_change == OnInsufficientChange::Burn {
                ctx.phase = Phase::Fallback;
                return Ok(());
            }

            return Err(BalanceError::InsufficientChange {
                lovelace: leftover.lovelace(),
                minimum: min_single,
            });
        }

        if let Some(unfrack_config) = self.options.unfrack.as_ref().filter(|_| ctx.can_unfrack) {
            match unfrack::plan(&leftover, unfrack_config, self.change_address, self.pparams) {
                Ok(outputs) => {
                    ctx.change_outputs = outputs;
                    ctx.phase = Phase::FeeCalculation;
                    return Ok(());
                }
                Err(_) => {
                    ctx.can_unfrack = false;
                }
            }
        }

        ctx.change_outputs = vec![candidate.set_lovelace(leftover.lovelace())];
        ctx.phase = Phase::FeeCalculation;
        Ok(())
    }

    fn fee_calculation(&self, state: &mut TransactionState, ctx: &mut BuildContext) -> Result<(), BalanceError> {
        let staging = self.staging(state, ctx);
        let fee = calculate_min_fee(&staging, &state.selected_inputs, self.pparams)?;
        ctx.latest_fee = fee;
        ctx.phase = Phase::Balance;
        Ok(())
    }

    fn balance(&self, state: &mut TransactionState, ctx: &mut BuildContext) -> Result<(), BalanceError> {
        let total_change: AssetBag = ctx.change_outputs.iter().map(|o| o.assets.clone()).collect();
        let mut spent = state.total_output_assets().add(&total_change);
        spent.set("lovelace", spent.lovelace() + ctx.latest_fee);

        let delta = state.total_input_assets().subtract(&spent);

        if delta.iter().all(|(_, qty)| *qty == 0) {
            ctx.phase = Phase::Complete;
            return Ok(());
        }

        let native_mismatch = delta.iter().any(|(unit, qty)| unit != "lovelace" && *qty != 0);
        if native_mismatch {
            return Err(BalanceError::Internal(
                "native asset delta non-zero at balance; coin selection or unfrack invariant violated".into(),
            ));
        }

        if delta.lovelace() > 0 {
            let excess = delta.lovelace() as u64;
            if let Some(index) = self.options.drain_to {
                if !ctx.change_outputs.is_empty() {
                    return Err(BalanceError::Internal(
                        "drainTo configured but change outputs are non-empty at balance".into(),
                    ));
                }
                let output = state.declared_outputs.get_mut(index).ok_or_else(|| {
                    BalanceError::InvalidInput(format!("drain_to index {index} out of range"))
                })?;
                let new_lovelace = output.lovelace() + excess;
                *output = output.clone().set_lovelace(new_lovelace);
                ctx.phase = Phase::Complete;
                return Ok(());
            }

            if self.options.on_insufficient_change == OnInsufficientChange::Burn && ctx.change_outputs.is_empty() {
                ctx.phase = Phase::Complete;
                return Ok(());
            }

            return Err(BalanceError::Internal(format!(
                "unaccounted-for excess of {excess} lovelace outside drain/burn modes"
            )));
        }

        ctx.phase = Phase::ChangeCreation;
        Ok(())
    }

    fn fallback(&self, ctx: &mut BuildContext) {
        ctx.change_outputs.clear();
        ctx.phase = Phase::FeeCalculation;
    }

    fn complete(&self, state: &TransactionState, ctx: &BuildContext) -> Result<BuiltTransaction, BalanceError> {
        let staging = self.staging(state, ctx).fee(ctx.latest_fee);
        let witness_count = fee::unique_payment_key_hash_count(&state.selected_inputs);
        let mut built = staging.build_conway(witness_count)?;
        built.selected_inputs = state.selected_inputs.clone();

        if built.size() as u64 > self.pparams.max_tx_size {
            return Err(BalanceError::TransactionTooLarge {
                size: built.size(),
                max_size: self.pparams.max_tx_size,
            });
        }

        Ok(built)
    }
}
