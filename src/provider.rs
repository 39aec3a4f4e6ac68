//! The chain-data collaborator this engine consumes but does not
//! implement. A real `Provider` talks to a node, Ogmios, or an indexer;
//! this crate only specifies the shape it needs.
//!
//! [`TxBuilder::build`](crate::builder::TxBuilder::build) takes its
//! provider and wallet as `Option<&dyn Provider>`/`Option<&dyn Wallet>`
//! so a caller can supply any concrete collaborator without this crate
//! naming it. Plain `async fn` in a trait is not object-safe, so the
//! methods return a boxed future by hand instead of relying on the
//! `async-trait` crate, which nothing else in this codebase pulls in.

use std::future::Future;
use std::pin::Pin;

use crate::config::ProtocolParameters;
use crate::error::BalanceError;
use crate::primitives::{Address, TxHash, Utxo};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Provider: Send + Sync {
    fn get_protocol_parameters(&self) -> BoxFuture<'_, Result<ProtocolParameters, BalanceError>>;

    fn get_utxos<'a>(&'a self, address: &'a Address) -> BoxFuture<'a, Result<Vec<Utxo>, BalanceError>>;

    /// Not used by the balancing core itself; kept on the trait because
    /// every real provider collaborator needs it, and callers assembling
    /// a transaction from this engine's output will reach for it next.
    fn submit_tx<'a>(&'a self, cbor: &'a [u8]) -> BoxFuture<'a, Result<TxHash, BalanceError>>;
}
