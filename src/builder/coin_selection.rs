//! Pluggable coin selection.
//!
//! [`select`] drives whichever [`CoinSelection`] strategy a build was
//! configured with. [`largest_first`] is the default and only built-in
//! strategy: two passes (lovelace, then each native unit in turn, per
//! spec.md §4.4's explicit ordering), each largest-first by the
//! resource being covered. Grounded in the teacher's `select_coins`
//! (`hose/src/builder/coin_selection.rs`) for the pick-and-subtract
//! technique: every time a UTxO is picked, its *entire* asset bag is
//! subtracted from what's still required, not just the one unit that
//! triggered the pick, so a UTxO picked for one resource correctly
//! credits whatever else it happens to carry.

use std::cmp::Reverse;

use crate::config::CoinSelection;
use crate::error::BalanceError;
use crate::primitives::{AssetBag, AssetDelta, Utxo, LOVELACE};

/// Runs the strategy named by `selection` against `available`, picking
/// UTxOs whose aggregate assets cover every positive unit in `target`.
pub fn select(
    selection: &CoinSelection,
    available: &[Utxo],
    target: &AssetBag,
) -> Result<Vec<Utxo>, BalanceError> {
    match selection {
        CoinSelection::LargestFirst => largest_first(available, target),
        CoinSelection::Custom(f) => f(available, target),
        CoinSelection::Named(name) => Err(BalanceError::BadConfiguration(
            match name.as_str() {
                "random-improve" => "coin selection algorithm \"random-improve\" is not implemented",
                "optimal" => "coin selection algorithm \"optimal\" is not implemented",
                _ => "unrecognized coin selection algorithm name",
            },
        )),
    }
}

/// Largest-first, per spec.md §4.4: cover lovelace first (largest
/// remaining UTxO by lovelace), then cover each native unit in `target`
/// in turn (largest remaining UTxO by that unit's quantity). Each pick
/// subtracts the picked UTxO's whole asset bag from what's still
/// required, so a UTxO pulled in for one resource also credits any
/// other unit it happens to carry, and no more UTxOs than needed are
/// ever selected.
fn largest_first(available: &[Utxo], target: &AssetBag) -> Result<Vec<Utxo>, BalanceError> {
    let mut pool: Vec<Utxo> = available.to_vec();
    let mut selected = Vec::new();
    let mut required = AssetDelta::from(target.clone());

    while required.lovelace() > 0 {
        pool.sort_by_key(|utxo| Reverse(utxo.lovelace()));
        let Some(utxo) = pool.first().cloned() else {
            let total_available: u64 = available.iter().map(|u| u.lovelace()).sum();
            return Err(BalanceError::InsufficientFunds {
                unit: LOVELACE.into(),
                required: target.lovelace(),
                available: total_available,
            });
        };
        pool.remove(0);
        required = required - AssetDelta::from(utxo.assets.clone());
        selected.push(utxo);
    }

    for unit in target.native_units().map(|(u, _)| u.clone()).collect::<Vec<_>>() {
        let total_available: u64 = available.iter().map(|utxo| utxo.assets.get(&unit)).sum();
        if total_available == 0 {
            return Err(BalanceError::MissingNativeAsset { unit });
        }

        while required.get(&unit) > 0 {
            pool.sort_by_key(|utxo| Reverse(utxo.assets.get(&unit)));
            let exhausted = pool.first().map(|utxo| utxo.assets.get(&unit)).unwrap_or(0) == 0;
            if exhausted {
                return Err(BalanceError::InsufficientFunds {
                    unit,
                    required: target.get(&unit),
                    available: total_available,
                });
            }
            let utxo = pool.remove(0);
            required = required - AssetDelta::from(utxo.assets.clone());
            selected.push(utxo);
        }
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Address, Hash, TxHash};

    fn addr() -> Address {
        Address::from_bech32("addr_test1vpmu4rtmmwz048t0skvc9mp57zygtn0cn7ylvrka58v9lwq75svg0").unwrap()
    }

    fn utxo(index: u64, lovelace: u64) -> Utxo {
        Utxo::new(TxHash::from([index as u8; 32]), index, addr(), AssetBag::empty().with(LOVELACE, lovelace))
    }

    #[test]
    fn picks_fewest_utxos_needed_for_lovelace() {
        let available = vec![utxo(1, 1_000_000), utxo(2, 5_000_000), utxo(3, 2_000_000)];
        let target = AssetBag::empty().with(LOVELACE, 4_000_000);
        let selected = largest_first(&available, &target).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].lovelace(), 5_000_000);
    }

    #[test]
    fn reports_missing_native_asset() {
        let available = vec![utxo(1, 1_000_000)];
        let unit = Hash::<28>::from([9u8; 28]).to_string() + &hex::encode(b"Tok");
        let target = AssetBag::empty().with(unit, 1);
        let result = largest_first(&available, &target);
        assert!(matches!(result, Err(BalanceError::MissingNativeAsset { .. })));
    }

    #[test]
    fn reports_insufficient_funds_when_unit_present_but_short() {
        let unit = Hash::<28>::from([9u8; 28]).to_string() + &hex::encode(b"Tok");
        let mut available_utxo = utxo(1, 1_000_000);
        available_utxo.assets.set(unit.clone(), 3);
        let target = AssetBag::empty().with(unit, 5);

        let result = largest_first(&[available_utxo], &target);
        match result {
            Err(BalanceError::InsufficientFunds { required, available, .. }) => {
                assert_eq!(required, 5);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn covers_lovelace_with_zero_target_and_only_assets() {
        let available = vec![utxo(1, 1_000_000)];
        let target = AssetBag::empty();
        let selected = largest_first(&available, &target).unwrap();
        assert!(selected.is_empty());
    }

    /// A UTxO picked to cover one native unit also credits whatever
    /// other unit it happens to carry; the selector must not re-read a
    /// second unit's full target quantity from scratch once a UTxO
    /// already selected has contributed toward it.
    #[test]
    fn credits_incidental_units_from_already_selected_utxos() {
        let unit_a = Hash::<28>::from([1u8; 28]).to_string() + &hex::encode(b"A");
        let unit_b = Hash::<28>::from([2u8; 28]).to_string() + &hex::encode(b"B");

        let u1 = Utxo::new(
            TxHash::from([1u8; 32]),
            1,
            addr(),
            AssetBag::empty().with(LOVELACE, 2_000_000).with(unit_a.clone(), 10).with(unit_b.clone(), 10),
        );
        let u2 = Utxo::new(
            TxHash::from([2u8; 32]),
            2,
            addr(),
            AssetBag::empty().with(LOVELACE, 500_000).with(unit_b.clone(), 5),
        );

        let target = AssetBag::empty().with(unit_a, 5).with(unit_b, 5);
        let selected = largest_first(&[u1, u2], &target).unwrap();

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].output_index, 1);
    }
}
