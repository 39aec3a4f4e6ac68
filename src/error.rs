//! The engine's flat error taxonomy. Every failure surfaced by
//! [`crate::builder`] is one of these variants, carrying the structured
//! context a caller needs to remediate: offending quantities, the asset
//! unit involved where relevant, and (for change-related failures) the
//! concrete remedies available.

use crate::builder::tx::error::CborError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BalanceError {
    #[error("insufficient funds: need {required} of {unit}, have {available} across available utxos")]
    InsufficientFunds {
        unit: String,
        required: u64,
        available: u64,
    },

    #[error("asset {unit} was requested but does not appear in any available utxo")]
    MissingNativeAsset { unit: String },

    #[error(
        "change would carry native assets but is short {shortfall} lovelace of their minimum utxo; \
         include the assets in a payment, add lovelace to cover the deposit, or reduce outputs"
    )]
    NativeAssetLocked { shortfall: u64 },

    #[error(
        "ada-only change of {lovelace} lovelace is below the minimum utxo of {minimum}; \
         add funds, set drain_to, or opt into on_insufficient_change = burn"
    )]
    InsufficientChange { lovelace: u64, minimum: u64 },

    #[error("transaction of {size} bytes exceeds the maximum size of {max_size} bytes")]
    TransactionTooLarge { size: usize, max_size: u64 },

    #[error("cannot resolve {0}: no per-build override and no collaborator supplied it")]
    BadConfiguration(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error(transparent)]
    Cbor(#[from] CborError),
}
