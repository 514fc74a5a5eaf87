use chrono::{DateTime, Utc};
use sea_orm::EntityTrait;

/// Per-entity-type capability table for the query side of the store.
///
/// Capabilities are declared once per entity type and resolved at compile
/// time; there is no per-row reflection. An entity without a capability
/// declares `None` for the corresponding column.
///
/// # Example
/// ```rust,ignore
/// impl StoreEntity for document::Entity {
///     fn soft_delete_col() -> Option<Self::Column> {
///         Some(document::Column::IsDeleted)
///     }
///     fn model_is_deleted(model: &Self::Model) -> bool {
///         model.is_deleted
///     }
///     fn order_field(name: &str) -> Option<Self::Column> {
///         match name {
///             "title" => Some(document::Column::Title),
///             "rank" => Some(document::Column::Rank),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait StoreEntity: EntityTrait {
    /// Column holding the soft-delete flag, or `None` when the entity type
    /// is not soft-deletable. The deletion timestamp is a value-level
    /// concern, stamped through [`AuditedModel::stamp_deletion`].
    fn soft_delete_col() -> Option<Self::Column> {
        None
    }

    /// Value-level probe used by the identifier-lookup guard: primary-key
    /// lookups bypass the query filter, so a fetched row is re-checked here.
    fn model_is_deleted(_model: &Self::Model) -> bool {
        false
    }

    /// Resolve a runtime order-field name to a column.
    ///
    /// This is the entity's field table for dynamic ordering; names not
    /// listed here are rejected when a specification orders by name.
    fn order_field(_name: &str) -> Option<Self::Column> {
        None
    }
}

/// Value-level audit capability for entities submitted to the write side.
///
/// Implemented on `ActiveModel`s (or any staged representation). Every method
/// has a no-op default so an entity opts into creation, update, and deletion
/// auditing independently; the stampers in [`crate::audit`] drive these hooks
/// and never touch storage.
pub trait AuditedModel {
    /// Current creation actor, if the entity carries one.
    ///
    /// The creation stamper treats `None` and blank/whitespace-only values
    /// as unstamped.
    fn created_by(&self) -> Option<String> {
        None
    }

    /// Record the creation actor and timestamp.
    fn stamp_creation(&mut self, _at: DateTime<Utc>, _by: &str) {}

    /// Record the modification actor and timestamp.
    fn stamp_update(&mut self, _at: DateTime<Utc>, _by: &str) {}

    /// Whether the entity is currently flagged soft-deleted.
    fn is_flagged_deleted(&self) -> bool {
        false
    }

    /// Set or clear the soft-delete flag.
    fn set_flagged_deleted(&mut self, _flag: bool) {}

    /// Record the deletion actor and timestamp.
    ///
    /// Stamps metadata only; flagging the row deleted is a separate step.
    fn stamp_deletion(&mut self, _at: DateTime<Utc>, _by: &str) {}
}
