//! `RepoKit` generic data-access layer over `SeaORM`.
//!
//! This crate packages the recurring persistence chores of a service backend
//! behind one entity-generic [`Repository`]: composable query specifications,
//! bounded paging with count metadata, soft-delete filtering, audit-field
//! stamping, bulk execution with a transactional fallback, and an explicit
//! transaction wrapper.
//!
//! # Features
//! - `sqlite` (default), `pg`, `mysql`: enable the matching `SeaORM`/`SQLx`
//!   backend
//!
//! # Example
//! ```rust,ignore
//! use repokit::{Order, Repository, Specification};
//! use sea_orm::ColumnTrait;
//!
//! let repo = Repository::<post::Entity>::new(conn);
//! let spec = Specification::new()
//!     .with_criteria(post::Column::AuthorId.eq(7))
//!     .order_by(post::Column::PublishedAt, Order::Desc);
//! let page = repo.get_paged(Some(&spec), 2, Some(25), false).await?;
//! println!("{} of {} rows", page.results.len(), page.row_count);
//! ```

pub mod audit;
pub mod bulk;
pub mod entity;
pub mod error;
pub mod eval;
pub mod page;
pub mod repo;
pub mod soft_delete;
pub mod spec;
pub mod tx;

pub use bulk::{BulkOptions, BulkOptionsProvider, StaticBulkOptions, DEFAULT_BATCH_SIZE};
pub use entity::{AuditedModel, StoreEntity};
pub use error::{Result, StoreError};
pub use eval::SpecificationExt;
pub use page::{PagedResult, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repo::Repository;
pub use soft_delete::SoftDeleteExt;
pub use spec::{OrderKey, Specification};
pub use tx::TxFailure;

pub use sea_orm::Order;
