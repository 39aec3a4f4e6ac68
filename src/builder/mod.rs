//! The public builder API: record payments and inputs, then `build()`
//! drives the balancing machine to a finished transaction.
//!
//! Grounded in the teacher's `TxBuilder` (`hose/src/builder/mod.rs`):
//! a chainable method-per-concern builder that accumulates onto an
//! internal body and a `build()` that resolves collaborators before
//! running the balancing loop. Certificates, minting, collateral,
//! redeemers, and script witnesses are non-goals here, so the rich
//! method surface the teacher exposes for those (`add_script_input`,
//! `register_script_stake`, `withdraw_from_script`, ...) has no
//! counterpart in this core.

pub mod coin_selection;
pub mod fee;
pub mod machine;
pub mod operation;
pub mod tx;
pub mod unfrack;

use crate::config::BuildOptions;
use crate::error::BalanceError;
use crate::primitives::{Address, AssetBag, DatumOption, Script, Utxo};
use crate::provider::Provider;
use crate::wallet::Wallet;
use machine::BalancingMachine;
use operation::{replay, Operation, TransactionState};
use tx::BuiltTransaction;

/// Accumulates payments and manually-selected inputs, deferred until
/// [`TxBuilder::build`] replays them against fresh state. The same
/// builder can be built more than once; no state survives between
/// calls beyond what `operations` records.
#[derive(Clone, Default)]
pub struct TxBuilder {
    operations: Vec<Operation>,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an output paying `assets` (including its `"lovelace"`
    /// component) to `address`.
    pub fn add_payment(mut self, address: Address, assets: AssetBag) -> Self {
        self.operations.push(Operation::Payment {
            address,
            assets,
            datum: None,
            script_ref: None,
        });
        self
    }

    pub fn add_payment_with_datum(mut self, address: Address, assets: AssetBag, datum: DatumOption) -> Self {
        self.operations.push(Operation::Payment {
            address,
            assets,
            datum: Some(datum),
            script_ref: None,
        });
        self
    }

    pub fn add_payment_with_script_ref(mut self, address: Address, assets: AssetBag, script_ref: Script) -> Self {
        self.operations.push(Operation::Payment {
            address,
            assets,
            datum: None,
            script_ref: Some(script_ref),
        });
        self
    }

    /// Manually selects `utxos` for consumption, outside of coin
    /// selection. A script-locked utxo in the set requires `redeemer`.
    pub fn add_input(mut self, utxo: Utxo) -> Self {
        self.operations.push(Operation::CollectFrom {
            inputs: vec![utxo],
            redeemer: None,
        });
        self
    }

    pub fn add_script_input(mut self, utxo: Utxo, redeemer: Vec<u8>) -> Self {
        self.operations.push(Operation::CollectFrom {
            inputs: vec![utxo],
            redeemer: Some(redeemer),
        });
        self
    }

    /// Resolves collaborators/overrides, replays the recorded
    /// operations against fresh state, and drives the balancing
    /// machine to completion.
    pub async fn build(
        &self,
        options: &BuildOptions,
        provider: Option<&dyn Provider>,
        wallet: Option<&dyn Wallet>,
    ) -> Result<BuiltTransaction, BalanceError> {
        let pparams = match options.protocol_parameters {
            Some(pparams) => pparams,
            None => provider
                .ok_or_else(|| BalanceError::BadConfiguration("no protocol parameters override and no provider configured"))?
                .get_protocol_parameters()
                .await?,
        };

        let change_address = match &options.change_address {
            Some(address) => address.clone(),
            None => wallet
                .ok_or_else(|| BalanceError::BadConfiguration("no change address override and no wallet configured"))?
                .address()
                .await?,
        };

        let available = match &options.available_utxos {
            Some(utxos) => utxos.clone(),
            None => provider
                .ok_or_else(|| BalanceError::BadConfiguration("no available-utxo override and no provider configured"))?
                .get_utxos(&change_address)
                .await?,
        };

        let network_id = network_id_of(&change_address);

        let mut state = TransactionState::default();
        replay(&self.operations, &mut state)?;

        let mut machine = BalancingMachine {
            pparams: &pparams,
            options,
            change_address: &change_address,
            network_id,
            available,
        };

        machine.run(&mut state)
    }
}

/// Derives the Conway network id from a Shelley-era address header byte
/// (bit 0 of the high nibble: 0 = testnet, 1 = mainnet). Byron-era
/// addresses carry no network id in this form and default to testnet.
fn network_id_of(address: &Address) -> u8 {
    address
        .to_vec()
        .first()
        .map(|header| header & 0x0F)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(bech32: &str) -> Address {
        Address::from_bech32(bech32).unwrap()
    }

    #[test]
    fn testnet_address_resolves_to_network_id_zero() {
        let address = addr("addr_test1vpmu4rtmmwz048t0skvc9mp57zygtn0cn7ylvrka58v9lwq75svg0");
        assert_eq!(network_id_of(&address), 0);
    }
}
