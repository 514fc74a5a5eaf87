//! Specification evaluator: composes a [`Specification`] onto a
//! `sea_orm::Select` in a fixed order.
//!
//! The order is significant: filtering must precede paging for correct row
//! counts, and ordering must precede paging for deterministic page contents.

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, Select};

use crate::entity::StoreEntity;
use crate::error::{Result, StoreError};
use crate::spec::{OrderKey, Specification};

/// Apply a specification onto a base query, producing a new query.
///
/// Pure transformation: the specification is not mutated and nothing is
/// executed. Steps run in fixed order, each skipped when the corresponding
/// field is unset:
///
/// 1. criteria as a filter predicate
/// 2. include directives, in insertion order
/// 3. order (runtime field names resolve through
///    [`StoreEntity::order_field`])
/// 4. offset, when `skip > 0`
/// 5. limit, when `take > 0`
///
/// A `None` specification returns the base query unchanged; this is a
/// defensive fallback, not a normal path.
///
/// # Errors
/// Returns [`StoreError::UnknownOrderField`] when a runtime order-field name
/// has no entry in the entity's field table.
pub fn evaluate<E>(base: Select<E>, spec: Option<&Specification<E>>) -> Result<Select<E>>
where
    E: StoreEntity,
{
    let Some(spec) = spec else {
        return Ok(base);
    };

    let mut query = base;

    if let Some(criteria) = &spec.criteria {
        query = query.filter(criteria.clone());
    }

    for include in &spec.includes {
        query = include(query);
    }

    if let Some((key, order)) = &spec.order {
        let col = match key {
            OrderKey::Column(col) => *col,
            OrderKey::Field(name) => E::order_field(name)
                .ok_or_else(|| StoreError::UnknownOrderField(name.clone()))?,
        };
        query = query.order_by(col, order.clone());
    }

    if spec.skip > 0 {
        query = query.offset(spec.skip);
    }
    if spec.take > 0 {
        query = query.limit(spec.take);
    }

    Ok(query)
}

/// Extension seam for applying specifications fluently.
pub trait SpecificationExt<E: StoreEntity>: Sized {
    /// Apply `spec` to this query. See [`evaluate`].
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownOrderField`] for unresolved runtime
    /// order-field names.
    fn apply_spec(self, spec: &Specification<E>) -> Result<Self>;
}

impl<E> SpecificationExt<E> for Select<E>
where
    E: StoreEntity,
{
    fn apply_spec(self, spec: &Specification<E>) -> Result<Self> {
        evaluate(self, Some(spec))
    }
}
