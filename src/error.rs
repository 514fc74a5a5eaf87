use thiserror::Error;

use crate::page::MAX_PAGE_SIZE;

/// Errors produced by the data-access layer.
///
/// Argument and capability violations are reported before any storage round
/// trip. Storage failures are passed through unmodified so callers keep the
/// full `DbErr` for their own retry/translation policy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Page number fell outside `1..` .
    #[error("page number must be >= 1, got {0}")]
    PageOutOfRange(u64),

    /// Page size fell outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be within 1..={MAX_PAGE_SIZE}, got {0}")]
    PageSizeOutOfRange(u64),

    /// A runtime order-field name had no entry in the entity's field table.
    #[error("unknown order field: {0}")]
    UnknownOrderField(String),

    /// A deleted-only retrieval was requested on an entity type without the
    /// soft-delete capability.
    #[error("entity type does not support soft deletion")]
    SoftDeleteUnsupported,

    /// Failure from the underlying storage engine.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
