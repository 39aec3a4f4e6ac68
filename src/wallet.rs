//! The address-resolution collaborator this engine consumes. Signing and
//! key management are out of scope for this core; see §1 non-goals.
//!
//! See [`crate::provider`] for why these methods return a boxed future
//! by hand rather than using `async fn` directly: this trait is used as
//! `Option<&dyn Wallet>`, and `async fn` in a trait is not object-safe.

use crate::error::BalanceError;
use crate::primitives::Address;
use crate::provider::BoxFuture;

pub trait Wallet: Send + Sync {
    fn address(&self) -> BoxFuture<'_, Result<Address, BalanceError>>;

    fn reward_address(&self) -> BoxFuture<'_, Result<Option<Address>, BalanceError>> {
        Box::pin(async { Ok(None) })
    }
}
