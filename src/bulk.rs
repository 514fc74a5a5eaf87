//! Bulk execution primitives: native multi-row statements and the staged
//! transactional fallback.
//!
//! The orchestration (provider resolution, audit stamping, fallback
//! diagnostics) lives on [`crate::repo::Repository`]; this module owns the
//! options contract and the two execution paths.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IdenStatic, IntoActiveModel,
    Iterable, PrimaryKeyToColumn, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Default number of rows per submitted batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for native bulk execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkOptions {
    /// Rows per submitted statement/chunk.
    pub batch_size: usize,
    /// Whether inserts fetch generated identities. Deletion never yields
    /// identities and ignores this.
    pub set_output_identity: bool,
    /// Hint that row order should survive across batches; passed through to
    /// the storage engine, not enforced here.
    pub preserve_insert_order: bool,
    /// Hint that submitted entities remain change-tracked by the caller.
    pub tracking_entities: bool,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            set_output_identity: true,
            preserve_insert_order: true,
            tracking_entities: false,
        }
    }
}

/// Pluggable source of [`BulkOptions`].
///
/// An absent provider is not an error: the orchestrator degrades to the
/// staged fallback path and says so through a warning-level diagnostic.
pub trait BulkOptionsProvider: Send + Sync {
    fn options(&self) -> BulkOptions;
}

/// Provider returning a fixed set of options.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBulkOptions(pub BulkOptions);

impl BulkOptionsProvider for StaticBulkOptions {
    fn options(&self) -> BulkOptions {
        self.0
    }
}

/// Partition `items` into consecutive chunks of at most `size`, preserving
/// input order. A zero `size` is clamped to 1.
pub(crate) fn chunked<T>(items: Vec<T>, size: usize) -> impl Iterator<Item = Vec<T>> {
    let size = size.max(1);
    let mut iter = items.into_iter().peekable();
    std::iter::from_fn(move || {
        if iter.peek().is_some() {
            Some(iter.by_ref().take(size).collect())
        } else {
            None
        }
    })
}

/// Resolve the single primary-key column used by the bulk delete paths.
fn single_pk_col<E: EntityTrait>() -> Result<E::Column> {
    let mut pks = E::PrimaryKey::iter();
    let pk = pks
        .next()
        .ok_or(StoreError::InvalidArgument("entity has no primary key"))?;
    if pks.next().is_some() {
        return Err(StoreError::InvalidArgument(
            "composite primary keys are not supported for bulk delete",
        ));
    }
    Ok(pk.into_column())
}

fn pk_values<E>(pk_col: E::Column, chunk: &[E::ActiveModel]) -> Result<Vec<sea_orm::Value>>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    chunk
        .iter()
        .map(|am| {
            am.get(pk_col).into_value().ok_or(StoreError::InvalidArgument(
                "primary key not set on entity in delete batch",
            ))
        })
        .collect()
}

/// Upsert clause updating every non-key column on primary-key conflict; the
/// native bulk-update shape.
fn upsert_clause<E: EntityTrait>() -> OnConflict {
    let pk_cols: Vec<E::Column> = E::PrimaryKey::iter()
        .map(PrimaryKeyToColumn::into_column)
        .collect();
    let pk_names: Vec<&str> = pk_cols.iter().map(IdenStatic::as_str).collect();
    let value_cols: Vec<E::Column> = E::Column::iter()
        .filter(|c| !pk_names.contains(&c.as_str()))
        .collect();

    let mut clause = OnConflict::columns(pk_cols);
    if value_cols.is_empty() {
        clause.do_nothing();
    } else {
        clause.update_columns(value_cols);
    }
    clause
}

/* ---------- native path: one multi-row statement per chunk ---------- */

pub(crate) async fn insert_batches<E, C>(
    conn: &C,
    entities: Vec<E::ActiveModel>,
    batch_size: usize,
    with_identity: bool,
) -> Result<u64>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    let mut affected: u64 = 0;
    for chunk in chunked(entities, batch_size) {
        if with_identity {
            // A multi-row insert result carries only the last generated id,
            // so the affected count is the submitted row count; any failed
            // row surfaces as an error instead.
            let len = chunk.len() as u64;
            E::insert_many(chunk).exec(conn).await?;
            affected += len;
        } else {
            affected += E::insert_many(chunk).exec_without_returning(conn).await?;
        }
    }
    Ok(affected)
}

pub(crate) async fn upsert_batches<E, C>(
    conn: &C,
    entities: Vec<E::ActiveModel>,
    batch_size: usize,
) -> Result<u64>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    let clause = upsert_clause::<E>();
    let mut affected: u64 = 0;
    for chunk in chunked(entities, batch_size) {
        affected += E::insert_many(chunk)
            .on_conflict(clause.clone())
            .exec_without_returning(conn)
            .await?;
    }
    Ok(affected)
}

pub(crate) async fn delete_batches<E, C>(
    conn: &C,
    entities: Vec<E::ActiveModel>,
    batch_size: usize,
) -> Result<u64>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    C: ConnectionTrait,
{
    let pk_col = single_pk_col::<E>()?;
    let mut affected: u64 = 0;
    for chunk in chunked(entities, batch_size) {
        let ids = pk_values::<E>(pk_col, &chunk)?;
        let res = E::delete_many()
            .filter(pk_col.is_in(ids))
            .exec(conn)
            .await?;
        affected += res.rows_affected;
    }
    Ok(affected)
}

/* ---------- staged fallback: chunks inside one transaction ---------- */

pub(crate) async fn insert_staged<E, C>(
    conn: &C,
    entities: Vec<E::ActiveModel>,
    batch_size: usize,
) -> Result<u64>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: TransactionTrait,
{
    let txn = conn.begin().await?;
    let mut affected: u64 = 0;
    for chunk in chunked(entities, batch_size) {
        affected += E::insert_many(chunk).exec_without_returning(&txn).await?;
    }
    txn.commit().await?;
    Ok(affected)
}

/// Same upsert shape as [`upsert_batches`], staged against one transaction.
/// Rows absent from the store are inserted on both paths, so degrading to
/// the fallback never changes what a bulk update does.
pub(crate) async fn update_staged<E, C>(
    conn: &C,
    entities: Vec<E::ActiveModel>,
    batch_size: usize,
) -> Result<u64>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: TransactionTrait,
{
    let clause = upsert_clause::<E>();
    let txn = conn.begin().await?;
    let mut affected: u64 = 0;
    for chunk in chunked(entities, batch_size) {
        affected += E::insert_many(chunk)
            .on_conflict(clause.clone())
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;
    Ok(affected)
}

pub(crate) async fn delete_staged<E, C>(
    conn: &C,
    entities: Vec<E::ActiveModel>,
    batch_size: usize,
) -> Result<u64>
where
    E: EntityTrait,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    C: TransactionTrait,
{
    let pk_col = single_pk_col::<E>()?;
    let txn = conn.begin().await?;
    let mut affected: u64 = 0;
    for chunk in chunked(entities, batch_size) {
        let ids = pk_values::<E>(pk_col, &chunk)?;
        let res = E::delete_many()
            .filter(pk_col.is_in(ids))
            .exec(&txn)
            .await?;
        affected += res.rows_affected;
    }
    txn.commit().await?;
    Ok(affected)
}
