//! Cardano transaction construction core: coin selection, change-output
//! shaping, iterative fee convergence, and balance enforcement, driven
//! by an explicit state machine over a fixed set of phases.
//!
//! Provider/wallet I/O, script evaluation, certificates, and signing
//! live outside this crate; see `provider` and `wallet` for the
//! collaborator traits this core depends on.

pub mod builder;
pub mod config;
pub mod error;
pub mod primitives;
pub mod provider;
pub mod wallet;

pub use builder::TxBuilder;
pub use config::{BuildOptions, ProtocolParameters};
pub use error::BalanceError;
