use sea_orm::sea_query::IntoCondition;
use sea_orm::{Condition, EntityTrait, Order, Select};

/// One eager-load/join directive. Directives are opaque query transforms so
/// a specification can request any relation shape the backend supports.
pub type IncludeFn<E> = Box<dyn Fn(Select<E>) -> Select<E> + Send + Sync>;

/// Order selector: a typed column known at compile time, or a runtime field
/// name resolved through the entity's field table at evaluation.
pub enum OrderKey<E: EntityTrait> {
    Column(E::Column),
    Field(String),
}

impl<E: EntityTrait> Clone for OrderKey<E>
where
    E::Column: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Column(c) => Self::Column(c.clone()),
            Self::Field(f) => Self::Field(f.clone()),
        }
    }
}

impl<E: EntityTrait> std::fmt::Debug for OrderKey<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Column(_) => f.write_str("OrderKey::Column(..)"),
            Self::Field(name) => write!(f, "OrderKey::Field({name:?})"),
        }
    }
}

/// Declarative filter/include/order/paging bundle for one entity type.
///
/// Built fluently, then treated as read-only by the evaluator. Mutators
/// conjoin (criteria), append (includes), or replace (order, paging); no
/// cross-field consistency is validated — composition order is the caller's
/// responsibility.
///
/// # Example
/// ```rust,ignore
/// use sea_orm::{ColumnTrait, Order};
///
/// let spec = Specification::<document::Entity>::new()
///     .with_criteria(document::Column::Rank.gt(10))
///     .order_by(document::Column::Title, Order::Asc)
///     .paged(20, 10);
/// ```
#[must_use]
pub struct Specification<E: EntityTrait> {
    pub(crate) criteria: Option<Condition>,
    pub(crate) includes: Vec<IncludeFn<E>>,
    pub(crate) order: Option<(OrderKey<E>, Order)>,
    pub(crate) skip: u64,
    pub(crate) take: u64,
}

impl<E: EntityTrait> Default for Specification<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> Specification<E> {
    pub fn new() -> Self {
        Self {
            criteria: None,
            includes: Vec::new(),
            order: None,
            skip: 0,
            take: 0,
        }
    }

    /// Add a filter predicate. Repeated calls conjoin.
    pub fn with_criteria<C: IntoCondition>(mut self, criteria: C) -> Self {
        let cond = criteria.into_condition();
        self.criteria = Some(match self.criteria.take() {
            Some(existing) => existing.add(cond),
            None => Condition::all().add(cond),
        });
        self
    }

    /// Append an eager-load/join directive. Directives are applied in
    /// insertion order.
    pub fn with_include<F>(mut self, include: F) -> Self
    where
        F: Fn(Select<E>) -> Select<E> + Send + Sync + 'static,
    {
        self.includes.push(Box::new(include));
        self
    }

    /// Order by a typed column. At most one order key is active; the last
    /// write wins.
    pub fn order_by(mut self, col: E::Column, order: Order) -> Self {
        self.order = Some((OrderKey::Column(col), order));
        self
    }

    /// Order by a runtime field name, resolved against the entity's field
    /// table when the specification is evaluated. Last write wins.
    pub fn order_by_field(mut self, name: impl Into<String>, order: Order) -> Self {
        self.order = Some((OrderKey::Field(name.into()), order));
        self
    }

    /// Set the result window. A `take` of zero means unbounded; a `skip` of
    /// zero means no offset.
    pub fn paged(mut self, skip: u64, take: u64) -> Self {
        self.skip = skip;
        self.take = take;
        self
    }

    #[must_use]
    pub fn skip(&self) -> u64 {
        self.skip
    }

    #[must_use]
    pub fn take(&self) -> u64 {
        self.take
    }
}
