//! The staging transaction: a thin, chainable accumulator for the
//! fields the balancing core actually needs (inputs, outputs, fee,
//! network id). Certificates, minting, withdrawals, collateral, and
//! redeemers are non-goals here and so have no home on this struct —
//! see `DESIGN.md` for what was trimmed from the teacher's richer
//! `StagingTransaction`.

pub mod build;
pub mod built;
pub mod error;

pub use built::BuiltTransaction;
pub use error::CborError;

use crate::primitives::{Input, TxOutput};

#[derive(Debug, Clone, Default)]
pub struct StagingTransaction {
    pub inputs: Vec<Input>,
    pub outputs: Vec<TxOutput>,
    pub fee: Option<u64>,
    pub network_id: Option<u8>,
}

impl StagingTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = Input>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn output(mut self, output: TxOutput) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn network_id(mut self, network_id: u8) -> Self {
        self.network_id = Some(network_id);
        self
    }

    /// Inputs sorted by (transaction-hash bytes, output index ascending),
    /// the canonical order the assembled transaction must use.
    pub fn canonical_inputs(&self) -> Vec<Input> {
        let mut inputs = self.inputs.clone();
        inputs.sort();
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::TxHash;

    #[test]
    fn canonical_inputs_does_not_mutate_insertion_order() {
        let staging = StagingTransaction::new()
            .input(Input::new(TxHash::from([2u8; 32]), 0))
            .input(Input::new(TxHash::from([1u8; 32]), 0));
        assert_eq!(staging.inputs[0].hash, TxHash::from([2u8; 32]));
        let canonical = staging.canonical_inputs();
        assert_eq!(canonical[0].hash, TxHash::from([1u8; 32]));
    }
}
