//! Caller-facing generic repository.
//!
//! Owns a connection handle plus the optional collaborators (bulk options
//! provider, transaction failure policy) and routes every operation through
//! the evaluator, soft-delete filter, paging engine, audit stampers, and
//! bulk orchestrator.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, IntoActiveModel,
    PartialModelTrait, PrimaryKeyTrait,
};
use tracing::warn;

use crate::audit;
use crate::bulk::{self, BulkOptionsProvider, DEFAULT_BATCH_SIZE};
use crate::entity::{AuditedModel, StoreEntity};
use crate::error::{Result, StoreError};
use crate::eval::evaluate;
use crate::page::{self, PagedResult};
use crate::soft_delete::SoftDeleteExt;
use crate::spec::Specification;
use crate::tx::{self, TxFailure};

/// Generic repository over one entity type.
///
/// Cheap to clone; per-call state lives in the arguments, so a repository
/// can be shared across tasks while each call remains independently owned.
pub struct Repository<E: StoreEntity> {
    conn: DatabaseConnection,
    bulk_provider: Option<Arc<dyn BulkOptionsProvider>>,
    tx_failure: TxFailure,
    _entity: PhantomData<E>,
}

impl<E: StoreEntity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            bulk_provider: self.bulk_provider.clone(),
            tx_failure: self.tx_failure,
            _entity: PhantomData,
        }
    }
}

impl<E: StoreEntity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::default().table_name())
            .field("bulk_provider", &self.bulk_provider.is_some())
            .field("tx_failure", &self.tx_failure)
            .finish()
    }
}

impl<E> Repository<E>
where
    E: StoreEntity,
    E::Model: Send + Sync,
{
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            bulk_provider: None,
            tx_failure: TxFailure::default(),
            _entity: PhantomData,
        }
    }

    /// Attach a bulk options provider, enabling the native bulk path.
    #[must_use]
    pub fn with_bulk_provider(mut self, provider: Arc<dyn BulkOptionsProvider>) -> Self {
        self.bulk_provider = Some(provider);
        self
    }

    /// Set what [`Self::run_in_transaction`] does with failures.
    #[must_use]
    pub fn with_tx_failure(mut self, policy: TxFailure) -> Self {
        self.tx_failure = policy;
        self
    }

    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /* ---------- reads ---------- */

    /// Fetch one entity by primary key.
    ///
    /// Identifier lookup bypasses the query-level soft-delete filter (the
    /// storage engine may serve it from a cache that includes deleted rows);
    /// the capability check runs as a post-fetch guard instead, so a
    /// soft-deleted row surfaces as `None` unless `include_deleted` is set.
    ///
    /// # Errors
    /// Storage failures pass through.
    pub async fn get_by_id(
        &self,
        id: impl Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType> + Send,
        include_deleted: bool,
    ) -> Result<Option<E::Model>> {
        let found = E::find_by_id(id).one(&self.conn).await?;
        Ok(found.filter(|m| include_deleted || !E::model_is_deleted(m)))
    }

    /// List entities matching `spec` (a `None` spec matches everything).
    ///
    /// # Errors
    /// Unresolved runtime order fields and storage failures.
    pub async fn get_all(
        &self,
        spec: Option<&Specification<E>>,
        include_deleted: bool,
    ) -> Result<Vec<E::Model>> {
        let query = evaluate(E::find(), spec)?.filter_deleted(include_deleted);
        Ok(query.all(&self.conn).await?)
    }

    /// First entity matching `spec`, if any.
    ///
    /// # Errors
    /// Unresolved runtime order fields and storage failures.
    pub async fn get_first(
        &self,
        spec: Option<&Specification<E>>,
        include_deleted: bool,
    ) -> Result<Option<E::Model>> {
        let query = evaluate(E::find(), spec)?.filter_deleted(include_deleted);
        Ok(query.one(&self.conn).await?)
    }

    /// List only soft-deleted entities matching `spec`.
    ///
    /// # Errors
    /// [`StoreError::SoftDeleteUnsupported`] when the entity type lacks the
    /// capability; this fails before any storage access.
    pub async fn get_only_deleted(
        &self,
        spec: Option<&Specification<E>>,
    ) -> Result<Vec<E::Model>> {
        let query = evaluate(E::find(), spec)?.only_deleted()?;
        Ok(query.all(&self.conn).await?)
    }

    /// Count entities matching `spec`.
    ///
    /// # Errors
    /// Unresolved runtime order fields and storage failures.
    pub async fn count(
        &self,
        spec: Option<&Specification<E>>,
        include_deleted: bool,
    ) -> Result<u64> {
        use sea_orm::PaginatorTrait;
        let query = evaluate(E::find(), spec)?.filter_deleted(include_deleted);
        Ok(query.count(&self.conn).await?)
    }

    /// One bounded page of entities matching `spec`.
    ///
    /// The page parameters own the result window: their offset/limit are
    /// applied last and override any skip/take carried by the
    /// specification. An unspecified `page_size` falls back to
    /// [`crate::page::DEFAULT_PAGE_SIZE`].
    ///
    /// # Errors
    /// Out-of-range paging parameters fail before any query execution.
    pub async fn get_paged(
        &self,
        spec: Option<&Specification<E>>,
        pg: u64,
        page_size: Option<u64>,
        include_deleted: bool,
    ) -> Result<PagedResult<E::Model>> {
        let query = evaluate(E::find(), spec)?.filter_deleted(include_deleted);
        page::paginate(query, &self.conn, pg, page_size, |m| m).await
    }

    /// Paged read mapping each row into a caller type.
    ///
    /// # Errors
    /// Same contract as [`Self::get_paged`].
    pub async fn get_paged_with<D, F>(
        &self,
        spec: Option<&Specification<E>>,
        pg: u64,
        page_size: Option<u64>,
        include_deleted: bool,
        map: F,
    ) -> Result<PagedResult<D>>
    where
        F: Fn(E::Model) -> D,
    {
        let query = evaluate(E::find(), spec)?.filter_deleted(include_deleted);
        page::paginate(query, &self.conn, pg, page_size, map).await
    }

    /// Paged read with the projection pushed into the slice query via a
    /// partial model, avoiding over-fetch of unused columns.
    ///
    /// # Errors
    /// Same contract as [`Self::get_paged`].
    pub async fn get_paged_into<P>(
        &self,
        spec: Option<&Specification<E>>,
        pg: u64,
        page_size: Option<u64>,
        include_deleted: bool,
    ) -> Result<PagedResult<P>>
    where
        P: PartialModelTrait + Send + Sync,
    {
        let query = evaluate(E::find(), spec)?.filter_deleted(include_deleted);
        page::paginate_into::<E, P, _>(query, &self.conn, pg, page_size).await
    }

    /* ---------- single-entity writes ---------- */

    /// Insert one entity and return the stored model.
    ///
    /// # Errors
    /// Storage failures pass through.
    pub async fn insert(&self, entity: E::ActiveModel) -> Result<E::Model>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        Ok(E::insert(entity).exec_with_returning(&self.conn).await?)
    }

    /// Update one entity and return the stored model.
    ///
    /// # Errors
    /// Storage failures pass through.
    pub async fn update(&self, entity: E::ActiveModel) -> Result<E::Model>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        Ok(E::update(entity).exec(&self.conn).await?)
    }

    /// Physically delete one entity.
    ///
    /// # Errors
    /// Storage failures pass through.
    pub async fn delete(&self, entity: E::ActiveModel) -> Result<u64>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    {
        Ok(E::delete(entity).exec(&self.conn).await?.rows_affected)
    }

    /// Soft-delete one entity: flag it deleted, stamp deletion metadata when
    /// an actor is supplied, and persist the update.
    ///
    /// # Errors
    /// [`StoreError::SoftDeleteUnsupported`] when the entity type lacks the
    /// capability; this fails before any storage access.
    pub async fn soft_delete(
        &self,
        mut entity: E::ActiveModel,
        user_id: Option<&str>,
    ) -> Result<E::Model>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + AuditedModel + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        if E::soft_delete_col().is_none() {
            return Err(StoreError::SoftDeleteUnsupported);
        }
        entity.set_flagged_deleted(true);
        if let Some(uid) = user_id {
            audit::stamp_deletion(std::slice::from_mut(&mut entity), uid);
        }
        Ok(E::update(entity).exec(&self.conn).await?)
    }

    /* ---------- bulk writes ---------- */

    /// Bulk insert, creation-stamped when `user_id` is supplied.
    ///
    /// With a bulk options provider the native multi-row path runs with the
    /// resolved options; without one, a warning is emitted and the batches
    /// are staged through a single transaction with one consolidated commit.
    ///
    /// # Errors
    /// Storage failures pass through unmodified.
    pub async fn bulk_insert(
        &self,
        mut entities: Vec<E::ActiveModel>,
        user_id: Option<&str>,
    ) -> Result<u64>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + AuditedModel + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        if entities.is_empty() {
            return Ok(0);
        }
        if let Some(uid) = user_id {
            audit::stamp_creation(&mut entities, uid);
        }
        match &self.bulk_provider {
            Some(provider) => {
                let opts = provider.options();
                bulk::insert_batches::<E, _>(
                    &self.conn,
                    entities,
                    opts.batch_size,
                    opts.set_output_identity,
                )
                .await
            }
            None => {
                self.warn_fallback();
                bulk::insert_staged::<E, _>(&self.conn, entities, DEFAULT_BATCH_SIZE).await
            }
        }
    }

    /// Bulk update, modification-stamped when `user_id` is supplied.
    ///
    /// Both execution paths run the update as a primary-key-conflict upsert,
    /// so a submitted row missing from the store is inserted rather than
    /// rejected.
    ///
    /// # Errors
    /// Storage failures pass through unmodified.
    pub async fn bulk_update(
        &self,
        mut entities: Vec<E::ActiveModel>,
        user_id: Option<&str>,
    ) -> Result<u64>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + AuditedModel + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        if entities.is_empty() {
            return Ok(0);
        }
        if let Some(uid) = user_id {
            audit::stamp_modification(&mut entities, uid);
        }
        match &self.bulk_provider {
            Some(provider) => {
                let opts = provider.options();
                bulk::upsert_batches::<E, _>(&self.conn, entities, opts.batch_size).await
            }
            None => {
                self.warn_fallback();
                bulk::update_staged::<E, _>(&self.conn, entities, DEFAULT_BATCH_SIZE).await
            }
        }
    }

    /// Bulk delete, deletion-stamped when `user_id` is supplied (metadata on
    /// already-flagged entities only; flags are not set here).
    ///
    /// Deletion never yields generated identities, whatever the configured
    /// options say.
    ///
    /// # Errors
    /// Unset primary keys and composite keys are rejected before any round
    /// trip; storage failures pass through unmodified.
    pub async fn bulk_delete(
        &self,
        mut entities: Vec<E::ActiveModel>,
        user_id: Option<&str>,
    ) -> Result<u64>
    where
        E::ActiveModel: ActiveModelTrait<Entity = E> + AuditedModel + Send,
    {
        if entities.is_empty() {
            return Ok(0);
        }
        if let Some(uid) = user_id {
            audit::stamp_deletion(&mut entities, uid);
        }
        match &self.bulk_provider {
            Some(provider) => {
                let opts = provider.options();
                bulk::delete_batches::<E, _>(&self.conn, entities, opts.batch_size).await
            }
            None => {
                self.warn_fallback();
                bulk::delete_staged::<E, _>(&self.conn, entities, DEFAULT_BATCH_SIZE).await
            }
        }
    }

    /* ---------- transactions ---------- */

    /// Run `f` inside a transaction under the repository's failure policy.
    ///
    /// # Errors
    /// See [`tx::run_in_transaction`].
    pub async fn run_in_transaction<F, T>(&self, f: F) -> Result<Option<T>>
    where
        F: for<'a> FnOnce(
                &'a DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        tx::run_in_transaction(&self.conn, self.tx_failure, f).await
    }

    fn warn_fallback(&self) {
        warn!(
            entity = E::default().table_name(),
            "no bulk options provider configured; staging batches through a transaction"
        );
    }
}
