use crate::primitives::{TxHash, Utxo};

/// The assembled, unsigned Babbage/Conway transaction. Carries a fake
/// witness set sized to match what real signing will eventually attach,
/// so callers (and `FeeCalculator`) can validate fee sufficiency against
/// the exact bytes that will be submitted once signed, plus the
/// selected-inputs list per spec.md §6 ("build() -> Transaction (plus
/// the computed fee, the selected inputs list, and a 'transaction with
/// fake witnesses' view for external fee validation)").
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTransaction {
    pub hash: TxHash,
    pub bytes: Vec<u8>,
    pub fee: u64,
    pub witness_count: usize,
    pub selected_inputs: Vec<Utxo>,
}

impl BuiltTransaction {
    pub fn cbor(&self) -> &[u8] {
        &self.bytes
    }

    pub fn cbor_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn selected_inputs(&self) -> &[Utxo] {
        &self.selected_inputs
    }
}
