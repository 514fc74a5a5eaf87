//! In-memory audit stampers.
//!
//! Each stamper walks a batch once and drives the [`AuditedModel`] hooks;
//! entities without the corresponding capability are untouched because the
//! hooks default to no-ops. Stampers never query the data source.

use chrono::Utc;

use crate::entity::AuditedModel;

fn is_blank(actor: Option<&str>) -> bool {
    actor.is_none_or(|s| s.trim().is_empty())
}

/// Stamp creation metadata on every entity whose `created_by` is absent or
/// blank. Pre-stamped entities keep their original actor, so callers that
/// stamp manually before bulk submission are not overwritten.
pub fn stamp_creation<A: AuditedModel>(batch: &mut [A], user_id: &str) {
    let now = Utc::now();
    for entity in batch {
        if is_blank(entity.created_by().as_deref()) {
            entity.stamp_creation(now, user_id);
        }
    }
}

/// Stamp modification metadata on every entity, unconditionally — unlike
/// creation there is no existing-value guard.
pub fn stamp_modification<A: AuditedModel>(batch: &mut [A], user_id: &str) {
    let now = Utc::now();
    for entity in batch {
        entity.stamp_update(now, user_id);
    }
}

/// Stamp deletion metadata on entities already flagged soft-deleted.
///
/// Entities not flagged are untouched: this records metadata for a deletion
/// that has happened, it does not perform the soft delete.
pub fn stamp_deletion<A: AuditedModel>(batch: &mut [A], user_id: &str) {
    let now = Utc::now();
    for entity in batch {
        if entity.is_flagged_deleted() {
            entity.stamp_deletion(now, user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Default, Clone)]
    struct Row {
        created_by: Option<String>,
        created_at: Option<DateTime<Utc>>,
        updated_by: Option<String>,
        deleted: bool,
        deleted_by: Option<String>,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl AuditedModel for Row {
        fn created_by(&self) -> Option<String> {
            self.created_by.clone()
        }
        fn stamp_creation(&mut self, at: DateTime<Utc>, by: &str) {
            self.created_at = Some(at);
            self.created_by = Some(by.to_owned());
        }
        fn stamp_update(&mut self, _at: DateTime<Utc>, by: &str) {
            self.updated_by = Some(by.to_owned());
        }
        fn is_flagged_deleted(&self) -> bool {
            self.deleted
        }
        fn set_flagged_deleted(&mut self, flag: bool) {
            self.deleted = flag;
        }
        fn stamp_deletion(&mut self, at: DateTime<Utc>, by: &str) {
            self.deleted_at = Some(at);
            self.deleted_by = Some(by.to_owned());
        }
    }

    struct Bare;
    impl AuditedModel for Bare {}

    #[test]
    fn creation_stamp_is_idempotent_against_prior_actor() {
        let mut batch = vec![Row::default()];
        stamp_creation(&mut batch, "alice");
        assert_eq!(batch[0].created_by.as_deref(), Some("alice"));
        let first_at = batch[0].created_at;

        stamp_creation(&mut batch, "bob");
        assert_eq!(batch[0].created_by.as_deref(), Some("alice"));
        assert_eq!(batch[0].created_at, first_at);
    }

    #[test]
    fn blank_actor_counts_as_unstamped() {
        let mut batch = vec![Row {
            created_by: Some("   ".into()),
            ..Row::default()
        }];
        stamp_creation(&mut batch, "carol");
        assert_eq!(batch[0].created_by.as_deref(), Some("carol"));
    }

    #[test]
    fn modification_stamp_has_no_guard() {
        let mut batch = vec![Row {
            updated_by: Some("old".into()),
            ..Row::default()
        }];
        stamp_modification(&mut batch, "new");
        assert_eq!(batch[0].updated_by.as_deref(), Some("new"));
    }

    #[test]
    fn deletion_stamp_requires_the_deleted_flag() {
        let mut batch = vec![
            Row {
                deleted: true,
                ..Row::default()
            },
            Row::default(),
        ];
        stamp_deletion(&mut batch, "dave");
        assert!(batch[0].deleted_at.is_some());
        assert_eq!(batch[0].deleted_by.as_deref(), Some("dave"));
        assert!(batch[1].deleted_at.is_none());
        assert!(batch[1].deleted_by.is_none());
    }

    #[test]
    fn entities_without_capability_are_untouched() {
        // Defaults are no-ops; this must not panic or loop.
        let mut batch = vec![Bare, Bare];
        stamp_creation(&mut batch, "x");
        stamp_modification(&mut batch, "x");
        stamp_deletion(&mut batch, "x");
    }
}
