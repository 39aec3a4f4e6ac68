pub mod assets;
pub mod datum;
pub mod hash;
pub mod input;
pub mod output;
pub mod script;
pub mod utxo;

pub use assets::{AssetBag, AssetDelta, AssetId, AssetUnit, LOVELACE};
pub use datum::DatumOption;
pub use hash::{Hash, PolicyId, TxHash};
pub use input::Input;
pub use output::TxOutput;
pub use script::{Script, ScriptKind};
pub use utxo::Utxo;

pub use pallas::ledger::addresses::Address;

pub type PubKeyHash = Hash<28>;
pub type PublicKey = Hash<32>;
