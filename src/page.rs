//! Paging engine: count + slice + projection into a page envelope.
//!
//! Count and slice are two separate round trips with no transactional
//! snapshot between them; concurrent writers can make `row_count` diverge
//! from the materialized slice. Callers needing stricter consistency should
//! run the paged read inside a read-only transaction.

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, PartialModelTrait, QuerySelect, Select};
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Upper bound for a single page.
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Page size used when a caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Immutable envelope for one page of results plus total-count metadata.
///
/// Constructed fresh per paging call and never reused.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub current_page: u64,
    pub page_size: u64,
    /// Total matching rows across all pages, not the page length.
    pub row_count: u64,
    pub page_count: u64,
    pub results: Vec<T>,
}

impl<T> PagedResult<T> {
    pub(crate) fn new(current_page: u64, page_size: u64, row_count: u64, results: Vec<T>) -> Self {
        Self {
            current_page,
            page_size,
            row_count,
            page_count: row_count.div_ceil(page_size),
            results,
        }
    }

    /// 1-based index of the first row slot on this page.
    #[must_use]
    pub fn first_row_on_page(&self) -> u64 {
        (self.current_page - 1) * self.page_size + 1
    }

    /// 1-based index of the last row on this page, clamped to the total.
    #[must_use]
    pub fn last_row_on_page(&self) -> u64 {
        (self.current_page * self.page_size).min(self.row_count)
    }
}

fn validate(page: u64, page_size: Option<u64>) -> Result<u64> {
    if page < 1 {
        return Err(StoreError::PageOutOfRange(page));
    }
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size < 1 || page_size > MAX_PAGE_SIZE {
        return Err(StoreError::PageSizeOutOfRange(page_size));
    }
    Ok(page_size)
}

/// Execute a paged read: count the full filtered query, slice one page, and
/// map the models into the envelope.
///
/// A page beyond the last yields empty `results` with totals still
/// reflecting the full set. An unspecified `page_size` falls back to
/// [`DEFAULT_PAGE_SIZE`].
///
/// # Errors
/// Out-of-range `page`/`page_size` fail before any query execution; storage
/// failures pass through.
pub async fn paginate<E, D, F, C>(
    select: Select<E>,
    conn: &C,
    page: u64,
    page_size: Option<u64>,
    map: F,
) -> Result<PagedResult<D>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    F: Fn(E::Model) -> D,
    C: ConnectionTrait,
{
    let page_size = validate(page, page_size)?;

    let row_count = select.clone().count(conn).await?;
    let skip = (page - 1) * page_size;

    let rows = select.offset(skip).limit(page_size).all(conn).await?;
    let results = rows.into_iter().map(map).collect();

    Ok(PagedResult::new(page, page_size, row_count, results))
}

/// Paged read with the projection pushed into the query via a SeaORM partial
/// model, so only the projected columns are fetched for the slice.
///
/// # Errors
/// Same contract as [`paginate`].
pub async fn paginate_into<E, P, C>(
    select: Select<E>,
    conn: &C,
    page: u64,
    page_size: Option<u64>,
) -> Result<PagedResult<P>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    P: PartialModelTrait + Send + Sync,
    C: ConnectionTrait,
{
    let page_size = validate(page, page_size)?;

    let row_count = select.clone().count(conn).await?;
    let skip = (page - 1) * page_size;

    let results = select
        .offset(skip)
        .limit(page_size)
        .into_partial_model::<P>()
        .all(conn)
        .await?;

    Ok(PagedResult::new(page, page_size, row_count, results))
}
