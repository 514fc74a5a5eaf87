#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use repokit::StoreEntity;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Set};

/// In-memory SQLite database. One connection only, so every statement in a
/// test sees the same memory instance.
pub async fn connect_sqlite() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory sqlite")
}

/// Soft-deletable, fully audited fixture entity.
pub mod doc {
    use chrono::{DateTime, Utc};
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "docs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub title: String,
        pub rank: i64,
        pub is_deleted: bool,
        pub created_at: Option<DateTimeUtc>,
        pub created_by: Option<String>,
        pub updated_at: Option<DateTimeUtc>,
        pub updated_by: Option<String>,
        pub deleted_at: Option<DateTimeUtc>,
        pub deleted_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl repokit::StoreEntity for Entity {
        fn soft_delete_col() -> Option<Self::Column> {
            Some(Column::IsDeleted)
        }

        fn model_is_deleted(model: &Self::Model) -> bool {
            model.is_deleted
        }

        fn order_field(name: &str) -> Option<Self::Column> {
            match name {
                "rank" => Some(Column::Rank),
                "title" => Some(Column::Title),
                _ => None,
            }
        }
    }

    fn current<V: Clone + Into<sea_orm::Value>>(value: &ActiveValue<V>) -> Option<V> {
        match value {
            ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.clone()),
            ActiveValue::NotSet => None,
        }
    }

    impl repokit::AuditedModel for ActiveModel {
        fn created_by(&self) -> Option<String> {
            current(&self.created_by).flatten()
        }

        fn stamp_creation(&mut self, at: DateTime<Utc>, by: &str) {
            self.created_at = ActiveValue::Set(Some(at));
            self.created_by = ActiveValue::Set(Some(by.to_owned()));
        }

        fn stamp_update(&mut self, at: DateTime<Utc>, by: &str) {
            self.updated_at = ActiveValue::Set(Some(at));
            self.updated_by = ActiveValue::Set(Some(by.to_owned()));
        }

        fn is_flagged_deleted(&self) -> bool {
            current(&self.is_deleted).unwrap_or(false)
        }

        fn set_flagged_deleted(&mut self, flag: bool) {
            self.is_deleted = ActiveValue::Set(flag);
        }

        fn stamp_deletion(&mut self, at: DateTime<Utc>, by: &str) {
            self.deleted_at = ActiveValue::Set(Some(at));
            self.deleted_by = ActiveValue::Set(Some(by.to_owned()));
        }
    }
}

/// Plain fixture entity: no soft deletion, no audit fields, uuid key.
pub mod note {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "notes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub body: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl repokit::StoreEntity for Entity {}

    impl repokit::AuditedModel for ActiveModel {}
}

pub async fn create_docs_table(conn: &DatabaseConnection) {
    conn.execute_unprepared(
        "CREATE TABLE docs (
id INTEGER PRIMARY KEY NOT NULL,
title TEXT NOT NULL,
rank INTEGER NOT NULL,
is_deleted INTEGER NOT NULL DEFAULT 0,
created_at TEXT,
created_by TEXT,
updated_at TEXT,
updated_by TEXT,
deleted_at TEXT,
deleted_by TEXT
)",
    )
    .await
    .expect("Failed to create docs table");
}

pub async fn create_notes_table(conn: &DatabaseConnection) {
    conn.execute_unprepared(
        "CREATE TABLE notes (
id TEXT PRIMARY KEY NOT NULL,
body TEXT NOT NULL
)",
    )
    .await
    .expect("Failed to create notes table");
}

/// Active model for a live doc row with empty audit fields.
pub fn doc_row(id: i64, title: &str, rank: i64) -> doc::ActiveModel {
    doc::ActiveModel {
        id: Set(id),
        title: Set(title.to_owned()),
        rank: Set(rank),
        is_deleted: Set(false),
        created_at: Set(None),
        created_by: Set(None),
        updated_at: Set(None),
        updated_by: Set(None),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
}

/// Seed `total` docs with ids `1..=total` and rank equal to the id; the
/// first `deleted` of them are flagged soft-deleted.
pub async fn seed_docs(conn: &DatabaseConnection, total: i64, deleted: i64) {
    use sea_orm::EntityTrait;
    for id in 1..=total {
        let mut row = doc_row(id, &format!("doc-{id}"), id);
        if id <= deleted {
            row.is_deleted = Set(true);
        }
        doc::Entity::insert(row)
            .exec(conn)
            .await
            .expect("Failed to seed doc");
    }
}

// Keeps the capability table honest for the guard tests.
pub fn doc_is_soft_deletable() -> bool {
    <doc::Entity as StoreEntity>::soft_delete_col().is_some()
}
