use pallas::ledger::primitives::conway::{NetworkId, TransactionBody, TransactionInput, Tx, VKeyWitness, WitnessSet};
use pallas::ledger::primitives::{Fragment, NonEmptySet, Set};
use pallas::ledger::traverse::ComputeHash;

use crate::builder::tx::built::BuiltTransaction;
use crate::builder::tx::error::CborError;
use crate::builder::tx::StagingTransaction;
use crate::primitives::Hash;

impl StagingTransaction {
    /// Assembles a Babbage/Conway transaction with `witness_count` fake
    /// vkey witnesses (32-byte placeholder key, 64-byte placeholder
    /// signature each). CBOR byte-string encoding size depends only on
    /// length, not content, so a placeholder witness set is bit-accurate
    /// for fee sizing without needing real key hashes.
    pub fn build_conway(&self, witness_count: usize) -> Result<BuiltTransaction, CborError> {
        let inputs = self
            .canonical_inputs()
            .into_iter()
            .map(|input| TransactionInput {
                transaction_id: input.hash.into(),
                index: input.index,
            })
            .collect::<Vec<_>>();

        let outputs = self
            .outputs
            .iter()
            .map(|output| output.build_babbage())
            .collect::<Result<Vec<_>, _>>()?;

        let network_id = match self.network_id {
            Some(nid) => Some(NetworkId::try_from(nid).map_err(|_| CborError::InvalidNetworkId)?),
            None => None,
        };

        let vkey_witnesses = (0..witness_count)
            .map(|_| VKeyWitness {
                vkey: vec![0u8; 32].into(),
                signature: vec![0u8; 64].into(),
            })
            .collect::<Vec<_>>();

        let pallas_tx: Tx = Tx {
            transaction_body: TransactionBody {
                inputs: Set::from(inputs),
                outputs,
                ttl: None,
                validity_interval_start: None,
                fee: self.fee.unwrap_or(0),
                certificates: None,
                withdrawals: None,
                auxiliary_data_hash: None,
                mint: None,
                script_data_hash: None,
                collateral: None,
                required_signers: None,
                network_id,
                collateral_return: None,
                reference_inputs: None,
                total_collateral: None,
                voting_procedures: None,
                proposal_procedures: None,
                treasury_value: None,
                donation: None,
            }
            .into(),
            transaction_witness_set: WitnessSet {
                vkeywitness: NonEmptySet::from_vec(vkey_witnesses),
                native_script: None,
                bootstrap_witness: None,
                plutus_v1_script: None,
                plutus_v2_script: None,
                plutus_v3_script: None,
                plutus_data: None,
                redeemer: None,
            }
            .into(),
            success: true,
            auxiliary_data: None.into(),
        };

        let hash = Hash(*pallas_tx.transaction_body.compute_hash());
        let bytes = pallas_tx
            .encode_fragment()
            .map_err(|_| CborError::EncodingFailed)?;

        Ok(BuiltTransaction {
            hash,
            bytes,
            fee: self.fee.unwrap_or(0),
            witness_count,
            // `StagingTransaction` only tracks canonical `Input` pointers, not
            // full `Utxo`s; the balancing machine fills this in for the
            // transaction it ultimately returns from `complete()`.
            selected_inputs: Vec::new(),
        })
    }
}
