//! Datum attachment for transaction outputs.

use crate::primitives::hash::Hash;

/// The datum attached to an output, either as a hash reference to a
/// datum published elsewhere or inlined directly in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatumOption {
    Hash(Hash<32>),
    Inline(Vec<u8>),
}
