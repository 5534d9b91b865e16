//! In-process document backend.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::core::{AdapterKind, Association, BackendAdapter, Record};
use crate::error::{BackendError, BackendResult};
use crate::filter::{DurationResolver, FilterSpec, Predicate, StatementBuilder};

use super::matcher;
use super::schema::{CollectionSchema, DOCUMENT_ID};
use super::statement::DocumentStatementBuilder;

const BACKEND_NAME: &str = "document";

/// Document backend holding collections of JSON documents in memory.
///
/// Models are mapped to collections with [`register_collection`]; filters
/// compile to operator documents evaluated by the matcher.
///
/// [`register_collection`]: DocumentBackend::register_collection
pub struct DocumentBackend {
    schemas: RwLock<HashMap<String, CollectionSchema>>,
    collections: RwLock<HashMap<String, Vec<Map<String, Value>>>>,
    next_id: AtomicU64,
    duration_resolver: DurationResolver,
}

impl Debug for DocumentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBackend")
            .field("models", &self.schemas.read().len())
            .field("collections", &self.collections.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for DocumentBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            duration_resolver: DurationResolver::default(),
        }
    }

    /// Uses the given resolver for date filters.
    pub fn with_duration_resolver(mut self, resolver: DurationResolver) -> Self {
        self.duration_resolver = resolver;
        self
    }

    /// Maps a model onto a collection, replacing any previous mapping.
    pub fn register_collection(&self, schema: CollectionSchema) {
        tracing::debug!(
            model = %schema.model_name,
            collection = %schema.collection,
            relations = schema.relations.len(),
            "Registered collection"
        );
        self.collections
            .write()
            .entry(schema.collection.clone())
            .or_default();
        self.schemas
            .write()
            .insert(schema.model_name.clone(), schema);
    }

    /// Returns the schema of a model.
    pub fn schema(&self, model_name: &str) -> Option<CollectionSchema> {
        self.schemas.read().get(model_name).cloned()
    }

    fn require_schema(&self, model_name: &str) -> BackendResult<CollectionSchema> {
        self.schema(model_name)
            .ok_or_else(|| BackendError::UnmappedModel {
                backend_name: BACKEND_NAME.to_string(),
                model_name: model_name.to_string(),
            })
    }

    /// Inserts a document into a model's collection and returns its `_id`.
    ///
    /// Documents without an `_id` are given a generated 24-digit hex id.
    pub fn insert(&self, model_name: &str, document: Value) -> BackendResult<Value> {
        let schema = self.require_schema(model_name)?;
        let Value::Object(mut fields) = document else {
            return Err(BackendError::SerializationError {
                message: format!("{} documents must be objects", model_name),
            });
        };

        let id = match fields.get(DOCUMENT_ID).filter(|v| !v.is_null()) {
            Some(id) => id.clone(),
            None => {
                let n = self.next_id.fetch_add(1, Ordering::Relaxed);
                let id = Value::String(format!("{:024x}", n));
                fields.insert(DOCUMENT_ID.to_string(), id.clone());
                id
            }
        };

        self.collections
            .write()
            .entry(schema.collection)
            .or_default()
            .push(fields);
        Ok(id)
    }

    /// Returns every document of a model, ignoring the default scope.
    pub fn documents(&self, model_name: &str) -> BackendResult<Vec<Record>> {
        let schema = self.require_schema(model_name)?;
        let collections = self.collections.read();
        Ok(collections
            .get(&schema.collection)
            .map(|docs| {
                docs.iter()
                    .map(|d| Record::new(model_name, DOCUMENT_ID, d.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Returns a statement builder bound to this backend's date formats.
    pub fn statement_builder(&self) -> DocumentStatementBuilder<'_> {
        DocumentStatementBuilder::new(&self.duration_resolver)
    }

    fn embedded_children(owner: &Record, association: &Association) -> Vec<Record> {
        let model = association.target_class_name.clone().unwrap_or_default();
        let to_record = |v: &Value| {
            v.as_object()
                .map(|fields| Record::new(model.clone(), DOCUMENT_ID, fields.clone()))
        };
        match owner.get(&association.foreign_key) {
            Some(Value::Array(items)) => items.iter().filter_map(to_record).collect(),
            Some(value) => to_record(value).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl BackendAdapter for DocumentBackend {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Document
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn associations(&self, model_name: &str) -> Vec<Association> {
        self.schemas
            .read()
            .get(model_name)
            .map(|schema| {
                schema
                    .relations
                    .iter()
                    .map(|r| r.to_association(model_name))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn compile_filter(&self, filter: &FilterSpec) -> Option<Predicate> {
        self.statement_builder()
            .to_statement(filter)
            .map(Predicate::Document)
    }

    async fn where_(&self, model_name: &str, predicate: &Predicate) -> BackendResult<Vec<Record>> {
        let Some(predicate) = predicate.as_document() else {
            return Err(BackendError::ForeignPredicate {
                backend_name: BACKEND_NAME.to_string(),
                predicate_kind: predicate.kind_name(),
            });
        };
        let schema = self.require_schema(model_name)?;

        let collections = self.collections.read();
        let mut records = Vec::new();
        for doc in collections.get(&schema.collection).into_iter().flatten() {
            if let Some(scope) = &schema.default_scope
                && !matcher::matches(doc, scope)?
            {
                continue;
            }
            if matcher::matches(doc, predicate)? {
                records.push(Record::new(model_name, DOCUMENT_ID, doc.clone()));
            }
        }

        tracing::debug!(
            model = %model_name,
            matched = records.len(),
            "Document query"
        );
        Ok(records)
    }

    async fn children_unscoped(
        &self,
        owner: &Record,
        association: &Association,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Record>> {
        let limit = limit.unwrap_or(usize::MAX);

        if association.embedded {
            return Ok(Self::embedded_children(owner, association)
                .into_iter()
                .take(limit)
                .collect());
        }

        let Some(target) = association.target_class_name.as_deref() else {
            return Ok(Vec::new());
        };
        let owner_id = owner.id().ok_or_else(|| BackendError::MissingPrimaryKey {
            model_name: owner.model_name().to_string(),
        })?;
        let schema = self.require_schema(target)?;

        let collections = self.collections.read();
        let owner_type = Value::String(owner.model_name().to_string());
        Ok(collections
            .get(&schema.collection)
            .into_iter()
            .flatten()
            .filter(|doc| matcher::equals(doc.get(&association.foreign_key), owner_id))
            .filter(|doc| match association.foreign_type.as_deref() {
                Some(column) => matcher::equals(doc.get(column), &owner_type),
                None => true,
            })
            .take(limit)
            .map(|doc| Record::new(target, DOCUMENT_ID, doc.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::document::Relation;
    use serde_json::json;

    fn backend() -> DocumentBackend {
        let backend = DocumentBackend::new();
        backend.register_collection(
            CollectionSchema::new("Note", "notes")
                .with_default_scope(json!({"archived": {"$ne": true}}))
                .with_relation(Relation::embeds_many("tags", "Tag"))
                .with_relation(Relation::has_many("comments", "Comment").with_as("commentable")),
        );
        backend.register_collection(
            CollectionSchema::new("Comment", "comments")
                .with_relation(Relation::belongs_to_polymorphic("commentable")),
        );
        backend
    }

    #[test]
    fn test_insert_assigns_id() {
        let backend = backend();
        let id = backend.insert("Note", json!({"title": "a"})).unwrap();
        assert_eq!(id, json!("000000000000000000000001"));

        let id = backend.insert("Note", json!({"_id": "n2"})).unwrap();
        assert_eq!(id, json!("n2"));

        assert!(backend.insert("Note", json!([1])).is_err());
        assert!(matches!(
            backend.insert("Ghost", json!({})),
            Err(BackendError::UnmappedModel { .. })
        ));
    }

    #[test]
    fn test_associations_from_relations() {
        let backend = backend();
        let assocs = backend.associations("Note");
        assert_eq!(assocs.len(), 2);
        assert!(assocs[0].embedded);
        assert_eq!(assocs[1].polymorphic_as(), Some("commentable"));
        assert!(backend.associations("Ghost").is_empty());
    }

    #[tokio::test]
    async fn test_where_applies_default_scope() {
        let backend = backend();
        backend
            .insert("Note", json!({"_id": "n1", "title": "Rust", "archived": false}))
            .unwrap();
        backend
            .insert("Note", json!({"_id": "n2", "title": "Rust", "archived": true}))
            .unwrap();
        backend.insert("Note", json!({"_id": "n3", "title": "Go"})).unwrap();

        let filter = FilterSpec::new("title", "string", "is", "Rust");
        let predicate = backend.compile_filter(&filter).unwrap();
        let records = backend.where_("Note", &predicate).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), Some(&json!("n1")));
        assert_eq!(backend.documents("Note").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_where_rejects_sql() {
        let backend = backend();
        let err = backend
            .where_("Note", &Predicate::all_rows())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ForeignPredicate { .. }));
    }

    #[tokio::test]
    async fn test_children_unscoped() {
        let backend = backend();
        backend
            .insert(
                "Note",
                json!({"_id": "n1", "archived": true, "tags": [{"_id": "t1"}, {"_id": "t2"}]}),
            )
            .unwrap();
        backend
            .insert(
                "Comment",
                json!({"_id": "c1", "commentable_id": "n1", "commentable_type": "Note"}),
            )
            .unwrap();
        backend
            .insert(
                "Comment",
                json!({"_id": "c2", "commentable_id": "n1", "commentable_type": "Post"}),
            )
            .unwrap();

        let owner = backend.documents("Note").unwrap().remove(0);
        let assocs = backend.associations("Note");

        let tags = backend
            .children_unscoped(&owner, &assocs[0], Some(1))
            .await
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].model_name(), "Tag");

        let comments = backend
            .children_unscoped(&owner, &assocs[1], None)
            .await
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id(), Some(&json!("c1")));
    }
}
