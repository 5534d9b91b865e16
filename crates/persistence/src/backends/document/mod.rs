//! Document backend.
//!
//! Collections of JSON documents kept in process. Models declare relations
//! with document-store vocabulary (`embeds_many`, `has_many ... as:`,
//! `belongs_to polymorphic`), and filters compile to operator documents such
//! as `{"title": {"$regex": "^intro", "$options": "i"}}`.

mod backend;
pub mod matcher;
mod schema;
mod statement;

pub use backend::DocumentBackend;
pub use schema::{CollectionSchema, DOCUMENT_ID, Relation, RelationMacro};
pub use statement::DocumentStatementBuilder;
