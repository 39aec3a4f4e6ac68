//! Fixed-size hash newtype used throughout the crate for transaction
//! hashes, policy ids and key hashes.
//!
//! The teacher crate pulls this from a private collaborator crate
//! (`hydrant`) that isn't available to us; we reimplement the small
//! surface this core actually touches.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const N: usize>(pub [u8; N]);

impl<const N: usize> Hash<N> {
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes).map_err(|_| hex::FromHexError::InvalidStringLength)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, std::array::TryFromSliceError> {
        let array: [u8; N] = bytes.try_into()?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    pub fn to_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl<const N: usize> fmt::Debug for Hash<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash<{}>({})", N, hex::encode(self.0))
    }
}

impl<const N: usize> fmt::Display for Hash<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl<const N: usize> FromStr for Hash<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<const N: usize> std::ops::Deref for Hash<N> {
    type Target = [u8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for Hash<N> {
    fn from(value: [u8; N]) -> Self {
        Self(value)
    }
}

impl From<Hash<28>> for pallas::crypto::hash::Hash<28> {
    fn from(value: Hash<28>) -> Self {
        value.0.into()
    }
}

impl From<pallas::crypto::hash::Hash<28>> for Hash<28> {
    fn from(value: pallas::crypto::hash::Hash<28>) -> Self {
        Hash(*value)
    }
}

impl From<Hash<32>> for pallas::crypto::hash::Hash<32> {
    fn from(value: Hash<32>) -> Self {
        value.0.into()
    }
}

impl From<pallas::crypto::hash::Hash<32>> for Hash<32> {
    fn from(value: pallas::crypto::hash::Hash<32>) -> Self {
        Hash(*value)
    }
}

pub type TxHash = Hash<32>;
pub type PolicyId = Hash<28>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let hash = Hash::<28>([7u8; 28]);
        let encoded = hash.to_string();
        let decoded: Hash<28> = encoded.parse().unwrap();
        assert_eq!(hash, decoded);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Hash::<28>::from_hex("aabb").is_err());
    }
}
