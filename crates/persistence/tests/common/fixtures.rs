//! Shared schemas and seed data.
//!
//! Relational side (SQLite):
//!
//! | Model | Table | Associations |
//! |-------|-------|--------------|
//! | `Blog::Author` | authors | has_many posts, has_one profile |
//! | `Blog::Post` | posts (scope: not deleted) | belongs_to author, has_many comments as commentable |
//! | `Photo` | photos | has_many comments as commentable |
//! | `Comment` | comments (scope: not hidden) | belongs_to commentable (polymorphic) |
//! | `Profile` | profiles | belongs_to author |
//!
//! Document side:
//!
//! | Model | Collection | Relations |
//! |-------|------------|-----------|
//! | `Note` | notes (scope: not archived) | embeds_one cover, embeds_many tags, has_many remarks as remarkable |
//! | `Bookmark` | bookmarks | has_many remarks as remarkable |
//! | `Remark` | remarks (scope: not hidden) | belongs_to remarkable (polymorphic) |

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use helios_admin_persistence::backends::document::{CollectionSchema, DocumentBackend, Relation};
#[cfg(feature = "sqlite")]
use helios_admin_persistence::backends::sqlite::{Reflection, SqliteBackend, TableSchema};
use helios_admin_persistence::config::AdminConfig;
use helios_admin_persistence::core::Record;
use helios_admin_persistence::model::{EntityDescriptor, ModelRegistry, StaticCatalog};

/// Configured models pool: includes a duplicate, an unknown name, an abstract
/// base and a plain type.
pub const MODELS_POOL: &[&str] = &[
    "Blog::Post",
    "Blog::Author",
    "Note",
    "Blog::Post",
    "Missing::Thing",
    "ApplicationRecord",
    "Settings",
    "Comment",
    "Remark",
    "Photo",
    "Bookmark",
    "Profile",
];

/// Returns the configuration exposing [`MODELS_POOL`].
pub fn admin_config() -> AdminConfig {
    AdminConfig::new(MODELS_POOL.iter().map(|s| s.to_string()).collect())
        .with_warn_on_missing_models(false)
}

/// Returns a catalog describing every fixture entity.
pub fn catalog() -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::with_entities([
        EntityDescriptor::relational("Blog::Author"),
        EntityDescriptor::relational("Blog::Post").with_human_name("Article"),
        EntityDescriptor::relational("Photo"),
        EntityDescriptor::relational("Comment"),
        EntityDescriptor::relational("Profile"),
        EntityDescriptor::abstract_relational("ApplicationRecord"),
        EntityDescriptor::plain("Settings"),
        EntityDescriptor::document("Note"),
        EntityDescriptor::document("Bookmark"),
        EntityDescriptor::document("Remark"),
    ]))
}

/// Creates the seeded blog database.
#[cfg(feature = "sqlite")]
pub fn sqlite_blog() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend
        .execute_batch(
            "CREATE TABLE authors (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE posts (
                 id INTEGER PRIMARY KEY,
                 author_id INTEGER,
                 title TEXT,
                 status TEXT,
                 score INTEGER,
                 rating REAL,
                 draft BOOLEAN,
                 published_on TEXT,
                 created_at TEXT,
                 deleted_at TEXT
             );
             CREATE TABLE profiles (id INTEGER PRIMARY KEY, author_id INTEGER, bio TEXT);
             CREATE TABLE photos (id INTEGER PRIMARY KEY, caption TEXT);
             CREATE TABLE comments (
                 id INTEGER PRIMARY KEY,
                 body TEXT,
                 commentable_id INTEGER,
                 commentable_type TEXT,
                 hidden BOOLEAN
             );

             INSERT INTO authors (id, name) VALUES (1, 'Ann'), (2, 'Bob');

             INSERT INTO posts (id, author_id, title, status, score, rating, draft,
                                published_on, created_at, deleted_at) VALUES
                 (1, 1, 'Intro to Rust', 'published', 10, 4.5, 0,
                  '2024-01-05', '2024-01-05 09:30:00', NULL),
                 (2, 1, 'Rust Ownership', 'draft', 3, NULL, 1,
                  NULL, '2024-01-06 18:00:00', NULL),
                 (3, 2, 'Go Channels', 'published', 7, 3.0, NULL,
                  '2024-02-10', '2024-02-10 00:00:00', NULL),
                 (4, 1, 'Deleted Post', 'archived', 1, NULL, 0,
                  '2024-01-20', '2024-01-20 12:00:00', '2024-03-01');

             INSERT INTO profiles (id, author_id, bio) VALUES
                 (1, 1, 'Rustacean'),
                 (2, 1, 'Duplicate profile');

             INSERT INTO photos (id, caption) VALUES (1, 'Sunset');

             INSERT INTO comments (id, body, commentable_id, commentable_type, hidden) VALUES
                 (1, 'Great', 1, 'Blog::Post', NULL),
                 (2, 'Hidden', 1, 'Blog::Post', 1),
                 (3, 'Nice shot', 1, 'Photo', NULL),
                 (4, 'Wrong owner type', 1, 'Blog::Author', NULL);",
        )
        .expect("Failed to seed blog schema");

    backend.register_table(
        TableSchema::new("Blog::Author", "authors")
            .with_reflection(Reflection::has_many("posts", "Blog::Post"))
            .with_reflection(Reflection::has_one("profile", "Profile")),
    );
    backend.register_table(
        TableSchema::new("Blog::Post", "posts")
            .with_default_scope("deleted_at IS NULL")
            .with_reflection(Reflection::belongs_to("author", "Blog::Author"))
            .with_reflection(Reflection::has_many("comments", "Comment").with_as("commentable")),
    );
    backend.register_table(
        TableSchema::new("Photo", "photos")
            .with_reflection(Reflection::has_many("comments", "Comment").with_as("commentable")),
    );
    backend.register_table(
        TableSchema::new("Comment", "comments")
            .with_default_scope("hidden IS NULL OR hidden = 0")
            .with_reflection(Reflection::belongs_to_polymorphic("commentable")),
    );
    backend.register_table(
        TableSchema::new("Profile", "profiles")
            .with_reflection(Reflection::belongs_to("author", "Blog::Author")),
    );
    backend
}

/// Creates the seeded notes store.
pub fn document_notes() -> DocumentBackend {
    let backend = DocumentBackend::new();
    backend.register_collection(
        CollectionSchema::new("Note", "notes")
            .with_default_scope(json!({"archived": {"$ne": true}}))
            .with_relation(Relation::embeds_one("cover", "Cover"))
            .with_relation(Relation::embeds_many("tags", "Tag"))
            .with_relation(Relation::has_many("remarks", "Remark").with_as("remarkable")),
    );
    backend.register_collection(
        CollectionSchema::new("Bookmark", "bookmarks")
            .with_relation(Relation::has_many("remarks", "Remark").with_as("remarkable")),
    );
    backend.register_collection(
        CollectionSchema::new("Remark", "remarks")
            .with_default_scope(json!({"hidden": {"$ne": true}}))
            .with_relation(Relation::belongs_to_polymorphic("remarkable")),
    );

    let notes = [
        json!({
            "_id": "n1",
            "title": "Intro to Rust",
            "status": "published",
            "pinned": true,
            "stars": 5,
            "author_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "published_on": "2024-01-05",
            "cover": {"_id": "c1", "url": "rust.png"},
            "tags": [{"_id": "t1", "label": "rust"}, {"_id": "t2", "label": "intro"}]
        }),
        json!({
            "_id": "n2",
            "title": "",
            "status": "draft",
            "pinned": false,
            "stars": 2,
            "published_on": "2024-02-10"
        }),
        json!({
            "_id": "n3",
            "title": "Archived musings",
            "status": "published",
            "stars": 4,
            "archived": true,
            "published_on": "2024-01-20"
        }),
        json!({
            "_id": "n4",
            "status": "published",
            "stars": 1
        }),
    ];
    for note in notes {
        backend.insert("Note", note).expect("Failed to seed note");
    }

    backend
        .insert("Bookmark", json!({"_id": "b1", "url": "https://example.org"}))
        .expect("Failed to seed bookmark");

    let remarks = [
        json!({"_id": "r1", "text": "first", "remarkable_id": "n1", "remarkable_type": "Note"}),
        json!({"_id": "r2", "text": "hidden", "remarkable_id": "n1", "remarkable_type": "Note", "hidden": true}),
        json!({"_id": "r3", "text": "bookmark", "remarkable_id": "n1", "remarkable_type": "Bookmark"}),
    ];
    for remark in remarks {
        backend.insert("Remark", remark).expect("Failed to seed remark");
    }

    backend
}

/// Creates a registry over both fixture backends.
#[cfg(feature = "sqlite")]
pub fn registry() -> ModelRegistry {
    ModelRegistry::new(&admin_config(), catalog())
        .with_adapter(Arc::new(sqlite_blog()))
        .with_adapter(Arc::new(document_notes()))
}

/// Returns the ids of the records, as JSON values.
pub fn ids(records: &[Record]) -> Vec<serde_json::Value> {
    records
        .iter()
        .filter_map(|r| r.id().cloned())
        .collect()
}
