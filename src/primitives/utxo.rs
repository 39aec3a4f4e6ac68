//! An unspent transaction output as seen from a wallet/provider: an
//! [`Input`] pointer plus the value and attachments it carries.

use pallas::ledger::addresses::Address;

use crate::primitives::assets::AssetBag;
use crate::primitives::datum::DatumOption;
use crate::primitives::hash::TxHash;
use crate::primitives::input::Input;
use crate::primitives::script::Script;

#[derive(Debug, Clone, PartialEq)]
pub struct Utxo {
    pub tx_hash: TxHash,
    pub output_index: u64,
    pub address: Address,
    pub assets: AssetBag,
    pub datum: Option<DatumOption>,
    pub script_ref: Option<Script>,
}

impl Utxo {
    pub fn new(tx_hash: TxHash, output_index: u64, address: Address, assets: AssetBag) -> Self {
        Self {
            tx_hash,
            output_index,
            address,
            assets,
            datum: None,
            script_ref: None,
        }
    }

    pub fn lovelace(&self) -> u64 {
        self.assets.lovelace()
    }

    pub fn pointer(&self) -> Input {
        Input::new(self.tx_hash, self.output_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_matches_hash_and_index() {
        let address = Address::from_bech32(
            "addr_test1vpmu4rtmmwz048t0skvc9mp57zygtn0cn7ylvrka58v9lwq75svg0",
        )
        .unwrap();
        let utxo = Utxo::new(
            TxHash::from([3u8; 32]),
            2,
            address,
            AssetBag::empty().with("lovelace", 5_000_000),
        );
        let input: Input = (&utxo).into();
        assert_eq!(input, utxo);
    }
}
