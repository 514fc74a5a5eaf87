//! Conditional soft-delete predicate injection.
//!
//! Orthogonal to the specification evaluator: both attach conjunctive
//! predicates, so the relative order of application does not change results.

use sea_orm::{ColumnTrait, QueryFilter, Select};

use crate::entity::StoreEntity;
use crate::error::{Result, StoreError};

/// Soft-delete filtering on a `Select<E>`.
pub trait SoftDeleteExt<E: StoreEntity>: Sized {
    /// Exclude soft-deleted rows unless `include_deleted` is set.
    ///
    /// Returns the query unchanged when `include_deleted` is true or the
    /// entity type is not soft-deletable.
    #[must_use]
    fn filter_deleted(self, include_deleted: bool) -> Self;

    /// Restrict the query to soft-deleted rows only.
    ///
    /// # Errors
    /// Returns [`StoreError::SoftDeleteUnsupported`] when the entity type is
    /// not soft-deletable.
    fn only_deleted(self) -> Result<Self>;
}

impl<E> SoftDeleteExt<E> for Select<E>
where
    E: StoreEntity,
{
    fn filter_deleted(self, include_deleted: bool) -> Self {
        if include_deleted {
            return self;
        }
        match E::soft_delete_col() {
            Some(col) => self.filter(col.eq(false)),
            None => self,
        }
    }

    fn only_deleted(self) -> Result<Self> {
        let col = E::soft_delete_col().ok_or(StoreError::SoftDeleteUnsupported)?;
        Ok(self.filter(col.eq(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::entity::prelude::*;
    use sea_orm::{DbBackend, QueryTrait};

    mod soft {
        use sea_orm::entity::prelude::*;

        #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "soft_rows")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
            pub is_deleted: bool,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod plain {
        use sea_orm::entity::prelude::*;

        #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "plain_rows")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    impl StoreEntity for soft::Entity {
        fn soft_delete_col() -> Option<Self::Column> {
            Some(soft::Column::IsDeleted)
        }
        fn model_is_deleted(model: &Self::Model) -> bool {
            model.is_deleted
        }
    }

    impl StoreEntity for plain::Entity {}

    #[test]
    fn excludes_deleted_rows_by_default() {
        let out = soft::Entity::find()
            .filter_deleted(false)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(out.contains("is_deleted"));
        assert!(out.contains("FALSE") || out.contains("= 0") || out.contains("false"));
    }

    #[test]
    fn include_deleted_leaves_query_unchanged() {
        let base = soft::Entity::find().build(DbBackend::Sqlite).to_string();
        let out = soft::Entity::find()
            .filter_deleted(true)
            .build(DbBackend::Sqlite)
            .to_string();
        assert_eq!(base, out);
    }

    #[test]
    fn non_capable_entity_is_never_filtered() {
        let base = plain::Entity::find().build(DbBackend::Sqlite).to_string();
        let out = plain::Entity::find()
            .filter_deleted(false)
            .build(DbBackend::Sqlite)
            .to_string();
        assert_eq!(base, out);
    }

    #[test]
    fn only_deleted_requires_the_capability() {
        assert!(soft::Entity::find().only_deleted().is_ok());
        assert!(matches!(
            plain::Entity::find().only_deleted().unwrap_err(),
            StoreError::SoftDeleteUnsupported
        ));
    }
}
