//! Transaction wrapper with an explicit failure policy.
//!
//! Whether a failed transaction propagates its error or absorbs it after
//! rollback is configuration, not a fixed behavior; the absorbed mode is
//! observable through the `Ok(None)` return and a warning-level diagnostic.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseTransaction, TransactionTrait};
use tracing::warn;

use crate::error::{Result, StoreError};

/// What a failed transaction does after rollback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TxFailure {
    /// Roll back and return the error to the caller.
    #[default]
    Propagate,
    /// Roll back, log at warning level, and report `None`.
    Absorb,
}

/// Run `f` inside a storage-level transaction: begin, execute, commit on
/// success. On any failure the transaction is rolled back and `policy`
/// decides whether the error surfaces.
///
/// Returns `Ok(Some(value))` on commit; `Ok(None)` only when a failure was
/// absorbed by policy.
///
/// # Errors
/// With [`TxFailure::Propagate`], closure and commit errors are returned
/// after rollback. Begin failures always propagate — there is nothing to
/// roll back.
pub async fn run_in_transaction<C, F, T>(conn: &C, policy: TxFailure, f: F) -> Result<Option<T>>
where
    C: TransactionTrait,
    F: for<'a> FnOnce(
            &'a DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>
        + Send,
    T: Send,
{
    let txn = conn.begin().await?;

    let res = f(&txn).await;

    match res {
        Ok(value) => match txn.commit().await {
            Ok(()) => Ok(Some(value)),
            Err(e) => absorb_or_propagate(StoreError::from(e), policy),
        },
        Err(e) => {
            let _ = txn.rollback().await;
            absorb_or_propagate(e, policy)
        }
    }
}

fn absorb_or_propagate<T>(err: StoreError, policy: TxFailure) -> Result<Option<T>> {
    match policy {
        TxFailure::Propagate => Err(err),
        TxFailure::Absorb => {
            warn!(error = %err, "transaction rolled back; failure absorbed by policy");
            Ok(None)
        }
    }
}
