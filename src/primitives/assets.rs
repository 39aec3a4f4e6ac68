//! AssetAlgebra: balanced multi-asset arithmetic over a mapping from
//! asset-unit to quantity.
//!
//! An [`AssetBag`] is the canonical, nonnegative representation used for
//! UTxOs, outputs, and anything that must conserve value. An
//! [`AssetDelta`] is its signed counterpart, produced by subtraction, and
//! is the representation [`CoinSelector`](crate::builder::coin_selection)
//! and [`UnfrackPlanner`](crate::builder::unfrack) work against before
//! projecting back to a canonical bag.
//!
//! The reserved unit `"lovelace"` denotes ADA; every other unit is the
//! hex-encoded concatenation of a 28-byte policy id and an asset name.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};

use crate::primitives::hash::PolicyId;

pub const LOVELACE: &str = "lovelace";

pub type AssetUnit = String;

/// Identifies a native asset by policy id and asset name, independent of
/// quantity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId {
    pub policy: PolicyId,
    pub name: Vec<u8>,
}

impl AssetId {
    pub fn new(policy: PolicyId, name: Vec<u8>) -> Self {
        Self { policy, name }
    }

    /// The unit string this asset occupies in an [`AssetBag`]: the
    /// hex-encoded policy id followed by the hex-encoded asset name.
    pub fn unit(&self) -> AssetUnit {
        format!("{}{}", self.policy, hex::encode(&self.name))
    }

    /// Parses a unit string (as produced by [`AssetId::unit`]) back into
    /// a policy id and asset name. Returns `None` for the reserved
    /// `"lovelace"` unit or malformed units.
    pub fn from_unit(unit: &str) -> Option<Self> {
        if unit == LOVELACE || unit.len() < 56 {
            return None;
        }
        let policy = PolicyId::from_hex(&unit[..56]).ok()?;
        let name = hex::decode(&unit[56..]).ok()?;
        Some(Self { policy, name })
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unit())
    }
}

/// A canonical, nonnegative multi-asset bag. Zero-quantity entries are
/// never represented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetBag(BTreeMap<AssetUnit, u64>);

impl AssetBag {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, unit: &str) -> u64 {
        self.0.get(unit).copied().unwrap_or(0)
    }

    pub fn lovelace(&self) -> u64 {
        self.get(LOVELACE)
    }

    pub fn set(&mut self, unit: impl Into<AssetUnit>, quantity: u64) {
        let unit = unit.into();
        if quantity == 0 {
            self.0.remove(&unit);
        } else {
            self.0.insert(unit, quantity);
        }
    }

    pub fn with(mut self, unit: impl Into<AssetUnit>, quantity: u64) -> Self {
        self.set(unit, quantity);
        self
    }

    pub fn get_units(&self) -> Vec<AssetUnit> {
        self.0.keys().cloned().collect()
    }

    /// Units other than `"lovelace"`, in canonical (sorted) order.
    pub fn native_units(&self) -> impl Iterator<Item = (&AssetUnit, &u64)> {
        self.0.iter().filter(|(unit, _)| unit.as_str() != LOVELACE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetUnit, &u64)> {
        self.0.iter()
    }

    pub fn add(&self, other: &AssetBag) -> AssetBag {
        let mut result = self.clone();
        for (unit, qty) in other.0.iter() {
            let entry = result.0.entry(unit.clone()).or_insert(0);
            *entry = entry.saturating_add(*qty);
        }
        result
    }

    pub fn merge<'a>(bags: impl IntoIterator<Item = &'a AssetBag>) -> AssetBag {
        bags.into_iter()
            .fold(AssetBag::empty(), |acc, bag| acc.add(bag))
    }

    /// Per-unit difference. May yield negative components; the result is
    /// represented in the signed [`AssetDelta`] layer.
    pub fn subtract(&self, other: &AssetBag) -> AssetDelta {
        AssetDelta::from(self.clone()) - AssetDelta::from(other.clone())
    }
}

impl Add for AssetBag {
    type Output = AssetBag;

    fn add(self, rhs: AssetBag) -> AssetBag {
        AssetBag::add(&self, &rhs)
    }
}

impl FromIterator<AssetBag> for AssetBag {
    fn from_iter<T: IntoIterator<Item = AssetBag>>(iter: T) -> Self {
        iter.into_iter().fold(AssetBag::empty(), |acc, b| acc.add(&b))
    }
}

/// A signed multi-asset bag, the intermediate representation produced by
/// [`AssetBag::subtract`]. Only units with a nonzero quantity are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetDelta(BTreeMap<AssetUnit, i64>);

impl AssetDelta {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, unit: &str) -> i64 {
        self.0.get(unit).copied().unwrap_or(0)
    }

    pub fn lovelace(&self) -> i64 {
        self.get(LOVELACE)
    }

    pub fn units(&self) -> Vec<AssetUnit> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetUnit, &i64)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Retain only strictly positive entries, projected back into a
    /// canonical, nonnegative [`AssetBag`].
    pub fn filter_positive(&self) -> AssetBag {
        let mut bag = AssetBag::empty();
        for (unit, qty) in self.0.iter() {
            if *qty > 0 {
                bag.set(unit.clone(), *qty as u64);
            }
        }
        bag
    }

    /// True when every entry is nonpositive, i.e. there is nothing left
    /// to cover.
    pub fn has_no_shortfall(&self) -> bool {
        self.0.values().all(|qty| *qty <= 0)
    }
}

impl From<AssetBag> for AssetDelta {
    fn from(bag: AssetBag) -> Self {
        AssetDelta(bag.0.into_iter().map(|(unit, qty)| (unit, qty as i64)).collect())
    }
}

impl TryFrom<AssetDelta> for AssetBag {
    type Error = NegativeQuantity;

    fn try_from(delta: AssetDelta) -> Result<Self, Self::Error> {
        let mut bag = AssetBag::empty();
        for (unit, qty) in delta.0 {
            if qty < 0 {
                return Err(NegativeQuantity(unit));
            }
            bag.set(unit, qty as u64);
        }
        Ok(bag)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("asset unit {0} has a negative quantity and cannot be represented as a canonical bag")]
pub struct NegativeQuantity(pub AssetUnit);

impl Sub for AssetDelta {
    type Output = AssetDelta;

    fn sub(self, rhs: AssetDelta) -> AssetDelta {
        let mut result = self.0;
        for (unit, qty) in rhs.0 {
            let entry = result.entry(unit).or_insert(0);
            *entry -= qty;
        }
        result.retain(|_, qty| *qty != 0);
        AssetDelta(result)
    }
}

impl Add for AssetDelta {
    type Output = AssetDelta;

    fn add(self, rhs: AssetDelta) -> AssetDelta {
        let mut result = self.0;
        for (unit, qty) in rhs.0 {
            let entry = result.entry(unit).or_insert(0);
            *entry += qty;
        }
        result.retain(|_, qty| *qty != 0);
        AssetDelta(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(byte: u8) -> PolicyId {
        PolicyId::from([byte; 28])
    }

    #[test]
    fn asset_id_unit_round_trips() {
        let id = AssetId::new(policy(9), b"TestToken".to_vec());
        let unit = id.unit();
        let parsed = AssetId::from_unit(&unit).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn lovelace_is_not_a_parsable_asset_id() {
        assert!(AssetId::from_unit(LOVELACE).is_none());
    }

    #[test]
    fn add_is_commutative_and_zero_is_canonical() {
        let a = AssetBag::empty().with(LOVELACE, 10).with("abc", 5);
        let b = AssetBag::empty().with(LOVELACE, 3);
        let sum1 = a.add(&b);
        let sum2 = b.add(&a);
        assert_eq!(sum1, sum2);
        assert_eq!(sum1.lovelace(), 13);
        assert_eq!(sum1.get("abc"), 5);
    }

    #[test]
    fn subtract_can_go_negative_but_filters_to_canonical() {
        let a = AssetBag::empty().with(LOVELACE, 5);
        let b = AssetBag::empty().with(LOVELACE, 8);
        let delta = a.subtract(&b);
        assert_eq!(delta.lovelace(), -3);
        assert!(delta.filter_positive().is_empty());
    }

    #[test]
    fn filter_positive_drops_zero_and_negative() {
        let delta = AssetDelta::from(AssetBag::empty().with(LOVELACE, 10))
            - AssetDelta::from(AssetBag::empty().with(LOVELACE, 10).with("x", 2));
        assert_eq!(delta.get("x"), -2);
        assert!(delta.filter_positive().is_empty());
    }

    #[test]
    fn try_from_rejects_negative_components() {
        let delta = AssetDelta::from(AssetBag::empty()) - AssetDelta::from(AssetBag::empty().with(LOVELACE, 1));
        assert!(AssetBag::try_from(delta).is_err());
    }
}
