//! Protocol parameters and per-build options.
//!
//! Unlike the CLI-facing `Config` this core's teacher reads from
//! environment variables via `clap`, these types are pure data resolved
//! by [`crate::builder::TxBuilder::build`] from either an override or a
//! [`crate::provider::Provider`]/[`crate::wallet::Wallet`] collaborator —
//! there is no CLI surface in this core.

use crate::primitives::{Address, AssetBag, Utxo};

/// The subset of Cardano's protocol parameters this engine needs: fee
/// coefficients, the minimum-UTxO rate, and the transaction size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolParameters {
    pub min_fee_coefficient: u64,
    pub min_fee_constant: u64,
    pub coins_per_utxo_byte: u64,
    pub max_tx_size: u64,
}

impl ProtocolParameters {
    /// Representative mainnet-like values, used as the default in tests
    /// and examples.
    pub fn testnet_default() -> Self {
        Self {
            min_fee_coefficient: 44,
            min_fee_constant: 155_381,
            coins_per_utxo_byte: 4_310,
            max_tx_size: 16_384,
        }
    }
}

/// A pluggable coin-selection strategy identifier for [`BuildOptions`].
#[derive(Clone)]
pub enum CoinSelection {
    LargestFirst,
    /// An algorithm name recognized by the engine but not necessarily
    /// implemented; unimplemented names surface `BadConfiguration`.
    Named(String),
    /// A caller-supplied selection function. Must be deterministic and
    /// pure: given the same `(available, target)` it always returns the
    /// same selection.
    Custom(CustomSelector),
}

pub type CustomSelector =
    fn(available: &[Utxo], target: &AssetBag) -> Result<Vec<Utxo>, crate::error::BalanceError>;

impl Default for CoinSelection {
    fn default() -> Self {
        Self::LargestFirst
    }
}

/// Behavior when change would be needed but cannot meet minimum-UTxO and
/// no `drainTo` target is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnInsufficientChange {
    #[default]
    Error,
    Burn,
}

/// Token-bundling parameters for [`UnfrackConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfrackTokenConfig {
    pub bundle_size: usize,
    pub isolate_fungibles: bool,
    pub group_nfts_by_policy: bool,
}

impl Default for UnfrackTokenConfig {
    fn default() -> Self {
        Self {
            bundle_size: 10,
            isolate_fungibles: false,
            group_nfts_by_policy: false,
        }
    }
}

/// Residual-ADA subdivision parameters for [`UnfrackConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfrackAdaConfig {
    pub subdivide_threshold: u64,
    /// Percentages allotted to each emitted ADA-only output; must sum
    /// to 100.
    pub subdivide_percentages: Vec<u8>,
}

impl Default for UnfrackAdaConfig {
    fn default() -> Self {
        Self {
            subdivide_threshold: 100_000_000,
            subdivide_percentages: vec![50, 15, 10, 10, 5, 5, 5],
        }
    }
}

/// Enables and configures the multi-output "unfrack" change-shaping
/// optimization. Absence (`BuildOptions::unfrack == None`) means
/// single-output change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnfrackConfig {
    pub tokens: UnfrackTokenConfig,
    pub ada: UnfrackAdaConfig,
}

/// Per-build overrides and knobs for [`crate::builder::TxBuilder::build`].
#[derive(Clone, Default)]
pub struct BuildOptions {
    pub coin_selection: CoinSelection,
    pub protocol_parameters: Option<ProtocolParameters>,
    pub change_address: Option<Address>,
    pub available_utxos: Option<Vec<Utxo>>,
    pub unfrack: Option<UnfrackConfig>,
    pub drain_to: Option<usize>,
    pub on_insufficient_change: OnInsufficientChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfrack_default_percentages_sum_to_one_hundred() {
        let ada = UnfrackAdaConfig::default();
        assert_eq!(ada.subdivide_percentages.iter().map(|p| *p as u32).sum::<u32>(), 100);
    }
}
