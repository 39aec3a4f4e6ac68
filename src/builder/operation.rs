//! Deferred user operations.
//!
//! Each call to [`TxBuilder::add_payment`](crate::builder::TxBuilder::add_payment)
//! or [`TxBuilder::add_input`](crate::builder::TxBuilder::add_input) appends a
//! tagged [`Operation`] rather than mutating any build-scoped state
//! directly. `build()` creates fresh state and replays the whole
//! operation list against it, so the same builder can be built multiple
//! times with no state leaking between calls.

use crate::error::BalanceError;
use crate::primitives::{Address, AssetBag, DatumOption, Script, Utxo};

#[derive(Clone)]
pub enum Operation {
    Payment {
        address: Address,
        assets: AssetBag,
        datum: Option<DatumOption>,
        script_ref: Option<Script>,
    },
    CollectFrom {
        inputs: Vec<Utxo>,
        redeemer: Option<Vec<u8>>,
    },
}

/// The fresh, per-build state an [`Operation`] list is replayed into.
#[derive(Clone, Default)]
pub struct TransactionState {
    pub selected_inputs: Vec<Utxo>,
    pub declared_outputs: Vec<crate::primitives::TxOutput>,
    total_input_assets: AssetBag,
    total_output_assets: AssetBag,
}

impl TransactionState {
    pub fn total_input_assets(&self) -> &AssetBag {
        &self.total_input_assets
    }

    pub fn total_output_assets(&self) -> &AssetBag {
        &self.total_output_assets
    }

    fn recache_inputs(&mut self) {
        self.total_input_assets = self
            .selected_inputs
            .iter()
            .map(|u| u.assets.clone())
            .collect();
    }

    fn recache_outputs(&mut self) {
        self.total_output_assets = self
            .declared_outputs
            .iter()
            .map(|o| o.assets.clone())
            .collect();
    }

    pub fn push_input(&mut self, utxo: Utxo) {
        self.selected_inputs.push(utxo);
        self.recache_inputs();
    }

    pub fn push_inputs(&mut self, utxos: impl IntoIterator<Item = Utxo>) {
        self.selected_inputs.extend(utxos);
        self.recache_inputs();
    }
}

/// Replays a recorded operation list into fresh [`TransactionState`].
pub fn replay(operations: &[Operation], state: &mut TransactionState) -> Result<(), BalanceError> {
    for operation in operations {
        match operation {
            Operation::Payment {
                address,
                assets,
                datum,
                script_ref,
            } => {
                // Bech32-formedness was already checked by Address::from_bech32
                // when the caller built this Address; an Address value is
                // proof of that.
                let mut output = crate::primitives::TxOutput::new(address.clone(), assets.lovelace());
                output.assets = assets.clone();
                output.datum = datum.clone();
                output.script = script_ref.clone();
                state.declared_outputs.push(output);
            }
            Operation::CollectFrom { inputs, redeemer } => {
                if inputs.is_empty() {
                    return Err(BalanceError::InvalidInput(
                        "addInput requires at least one utxo".into(),
                    ));
                }
                for utxo in inputs {
                    if utxo.address.has_script() && redeemer.is_none() {
                        return Err(BalanceError::InvalidInput(format!(
                            "utxo {}#{} is script-locked but no redeemer was supplied",
                            utxo.tx_hash, utxo.output_index
                        )));
                    }
                }
                state.push_inputs(inputs.iter().cloned());
            }
        }
    }
    state.recache_outputs();
    Ok(())
}
