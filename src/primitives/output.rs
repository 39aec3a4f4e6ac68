use std::collections::BTreeMap;

use pallas::codec::utils::{Bytes, CborWrap};
use pallas::crypto::hash::Hash as PallasHash;
use pallas::ledger::addresses::Address;
use pallas::ledger::primitives::conway::{
    self, NativeScript, PlutusData, PlutusScript, PostAlonzoTransactionOutput,
    ScriptRef as PallasScript, TransactionOutput, Value,
};
use pallas::ledger::primitives::{Fragment, PositiveCoin};

use crate::builder::tx::error::CborError;
use crate::config::ProtocolParameters;
use crate::primitives::assets::{AssetBag, AssetId, LOVELACE};
use crate::primitives::datum::DatumOption;
use crate::primitives::hash::Hash;
use crate::primitives::script::{Script, ScriptKind};

/// A transaction output under construction: an address, a value (carried
/// as an [`AssetBag`] including its reserved `"lovelace"` unit), and
/// optional datum/script attachments.
#[derive(Debug, Clone, PartialEq)]
pub struct TxOutput {
    pub address: Address,
    pub assets: AssetBag,
    pub datum: Option<DatumOption>,
    pub script: Option<Script>,
}

impl TxOutput {
    pub fn new(address: Address, lovelace: u64) -> Self {
        Self {
            address,
            assets: AssetBag::empty().with(LOVELACE, lovelace),
            datum: None,
            script: None,
        }
    }

    pub fn lovelace(&self) -> u64 {
        self.assets.lovelace()
    }

    pub fn set_lovelace(mut self, lovelace: u64) -> Self {
        self.assets.set(LOVELACE, lovelace);
        self
    }

    pub fn add_asset(mut self, policy: Hash<28>, name: Vec<u8>, amount: u64) -> Result<Self, CborError> {
        if name.len() > 32 {
            return Err(CborError::AssetNameTooLong);
        }
        let id = AssetId::new(policy, name);
        let existing = self.assets.get(&id.unit());
        self.assets.set(id.unit(), existing.saturating_add(amount));
        Ok(self)
    }

    pub fn add_assets(mut self, assets: AssetBag) -> Self {
        self.assets = self.assets.add(&assets);
        self
    }

    pub fn set_datum(mut self, bytes: Vec<u8>) -> Self {
        self.datum = Some(DatumOption::Inline(bytes));
        self
    }

    pub fn set_datum_hash(mut self, hash: Hash<32>) -> Self {
        self.datum = Some(DatumOption::Hash(hash));
        self
    }

    pub fn clear_datum(mut self) -> Self {
        self.datum = None;
        self
    }

    pub fn set_script(mut self, kind: ScriptKind, bytes: Vec<u8>) -> Self {
        self.script = Some(Script::new(kind, bytes));
        self
    }

    pub fn clear_script(mut self) -> Self {
        self.script = None;
        self
    }

    /// Size in bytes of this output's Babbage/Conway CBOR encoding.
    pub fn size(&self) -> Result<usize, CborError> {
        Ok(self
            .build_babbage()?
            .encode_fragment()
            .map_err(|_| CborError::EncodingFailed)?
            .len())
    }

    /// Minimum amount of lovelace required for this output to be a valid
    /// UTxO under `pparams`.
    ///
    /// The minimum deposit depends on the serialized size of the output,
    /// which in turn depends on the lovelace amount itself (larger
    /// values take more CBOR bytes to encode). We converge to a fixed
    /// point: recompute the minimum from the current size, raise the
    /// output's lovelace to at least that minimum, and repeat until the
    /// computed minimum stops changing. The amount of lovelace added is
    /// non-decreasing and CBOR field widths only take finitely many
    /// steps, so this always terminates.
    pub fn min_deposit(&self, pparams: &ProtocolParameters) -> Result<u64, CborError> {
        let mut sized_output = self.clone();
        let mut previous_required_lovelace = 0_u64;
        loop {
            let next_required_lovelace = pparams.coins_per_utxo_byte
                * (sized_output.size()? as u64);

            if next_required_lovelace == previous_required_lovelace {
                return Ok(next_required_lovelace);
            }

            previous_required_lovelace = next_required_lovelace;
            sized_output = sized_output.set_lovelace(sized_output.lovelace().max(next_required_lovelace));
        }
    }

    pub fn build_babbage(&self) -> Result<TransactionOutput<'_>, CborError> {
        let mut assets: BTreeMap<PallasHash<28>, BTreeMap<Bytes, PositiveCoin>> = BTreeMap::new();

        for (unit, amount) in self.assets.native_units() {
            let Some(asset_id) = AssetId::from_unit(unit) else {
                continue;
            };
            let Ok(amount) = PositiveCoin::try_from(*amount) else {
                continue;
            };
            assets
                .entry(asset_id.policy.into())
                .or_default()
                .insert(asset_id.name.clone().into(), amount);
        }

        let assets = (!assets.is_empty()).then(|| assets.into_iter().collect());

        let value = match assets {
            Some(assets) => Value::Multiasset(self.lovelace(), assets),
            None => Value::Coin(self.lovelace()),
        };

        let datum_option = match self.datum.clone() {
            Some(DatumOption::Hash(dh)) => Some(conway::DatumOption::Hash(dh.into())),
            Some(DatumOption::Inline(pd)) => {
                let pd = PlutusData::decode_fragment(pd.as_ref())
                    .map_err(|_| CborError::MalformedDatum)?;
                Some(conway::DatumOption::Data(CborWrap(pd.into())))
            }
            None => None,
        };

        let script_ref = if let Some(ref s) = self.script {
            let script = match s.kind {
                ScriptKind::Native => PallasScript::NativeScript(
                    NativeScript::decode_fragment(s.bytes.as_ref())
                        .map_err(|_| CborError::MalformedScript)?
                        .into(),
                ),
                ScriptKind::PlutusV1 => {
                    PallasScript::PlutusV1Script(PlutusScript::<1>(s.bytes.clone().into()))
                }
                ScriptKind::PlutusV2 => {
                    PallasScript::PlutusV2Script(PlutusScript::<2>(s.bytes.clone().into()))
                }
                ScriptKind::PlutusV3 => {
                    PallasScript::PlutusV3Script(PlutusScript::<3>(s.bytes.clone().into()))
                }
            };

            Some(CborWrap(script))
        } else {
            None
        };

        Ok(TransactionOutput::PostAlonzo(
            PostAlonzoTransactionOutput {
                address: self.address.to_vec().into(),
                value,
                datum_option: datum_option.map(|x| x.into()),
                script_ref,
            }
            .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address() -> Address {
        Address::from_bech32("addr_test1vpmu4rtmmwz048t0skvc9mp57zygtn0cn7ylvrka58v9lwq75svg0").unwrap()
    }

    fn pparams() -> ProtocolParameters {
        ProtocolParameters {
            coins_per_utxo_byte: 4_310,
            ..ProtocolParameters::testnet_default()
        }
    }

    #[test]
    fn min_deposit_is_large_enough_for_itself() {
        let output = TxOutput::new(test_address(), 0);
        let min = output.min_deposit(&pparams()).unwrap();
        let grown = output.set_lovelace(min);
        let min_again = grown.min_deposit(&pparams()).unwrap();
        assert_eq!(min, min_again);
    }

    #[test]
    fn min_deposit_grows_with_native_assets() {
        let base = TxOutput::new(test_address(), 0).min_deposit(&pparams()).unwrap();
        let with_asset = TxOutput::new(test_address(), 0)
            .add_asset(Hash::from([1u8; 28]), b"Token".to_vec(), 1)
            .unwrap()
            .min_deposit(&pparams())
            .unwrap();
        assert!(with_asset > base);
    }

    #[test]
    fn add_asset_rejects_long_names() {
        let result = TxOutput::new(test_address(), 0).add_asset(Hash::from([1u8; 28]), vec![0u8; 33], 1);
        assert!(result.is_err());
    }
}
