//! SQLite backend implementation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{AdapterKind, Association, BackendAdapter, Record};
use crate::error::{BackendError, BackendResult};
use crate::filter::{
    DurationResolver, FilterSpec, Predicate, SqlFragment, SqlParam, StatementBuilder,
};

use super::schema::{TableSchema, quote_ident};
use super::statement::SqliteStatementBuilder;

const BACKEND_NAME: &str = "sqlite";

/// SQLite backend for table-backed models.
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteBackendConfig,
    is_memory: bool,
    /// Model name to table mapping.
    tables: RwLock<HashMap<String, TableSchema>>,
    duration_resolver: DurationResolver,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .field("tables", &self.tables.read().len())
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool. In-memory databases always
    /// use a single connection.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for better concurrency.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enable foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend.
    pub fn in_memory() -> BackendResult<Self> {
        Self::with_config(":memory:", SqliteBackendConfig::default())
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default())
    }

    /// Creates a backend with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteBackendConfig) -> BackendResult<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let is_memory = path_str == ":memory:";

        let busy_timeout = std::time::Duration::from_millis(u64::from(config.busy_timeout_ms));
        let foreign_keys = config.enable_foreign_keys;
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if foreign_keys {
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            }
            Ok(())
        });

        // Every in-memory connection is its own database; keep exactly one alive.
        let builder = if is_memory {
            Pool::builder()
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            Pool::builder()
                .max_size(config.max_connections)
                .min_idle(Some(config.min_connections))
        };

        let pool = builder
            .connection_timeout(std::time::Duration::from_millis(
                config.connection_timeout_ms,
            ))
            .build(manager)
            .map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: e.to_string(),
            })?;

        let backend = Self {
            pool,
            config,
            is_memory,
            tables: RwLock::new(HashMap::new()),
            duration_resolver: DurationResolver::default(),
        };

        backend.configure_connection()?;

        tracing::info!(
            path = %path_str,
            in_memory = is_memory,
            "Opened SQLite backend"
        );

        Ok(backend)
    }

    /// Uses the given resolver for date filters.
    pub fn with_duration_resolver(mut self, resolver: DurationResolver) -> Self {
        self.duration_resolver = resolver;
        self
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(&self) -> BackendResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Configure database-wide settings.
    fn configure_connection(&self) -> BackendResult<()> {
        if self.config.enable_wal && !self.is_memory {
            let conn = self.get_connection()?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")
                .map_err(|e| BackendError::Internal {
                    backend_name: BACKEND_NAME.to_string(),
                    message: format!("Failed to enable WAL mode: {}", e),
                    source: None,
                })?;
        }
        Ok(())
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }

    /// Runs one or more SQL statements (typically DDL or fixtures).
    pub fn execute_batch(&self, sql: &str) -> BackendResult<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Maps a model onto a table, replacing any previous mapping.
    pub fn register_table(&self, schema: TableSchema) {
        tracing::debug!(
            model = %schema.model_name,
            table = %schema.table,
            reflections = schema.reflections.len(),
            "Registered table"
        );
        self.tables
            .write()
            .insert(schema.model_name.clone(), schema);
    }

    /// Returns the table mapping of a model.
    pub fn table(&self, model_name: &str) -> Option<TableSchema> {
        self.tables.read().get(model_name).cloned()
    }

    fn require_table(&self, model_name: &str) -> BackendResult<TableSchema> {
        self.table(model_name)
            .ok_or_else(|| BackendError::UnmappedModel {
                backend_name: BACKEND_NAME.to_string(),
                model_name: model_name.to_string(),
            })
    }

    /// Inserts a row from a JSON object and returns its rowid.
    pub fn insert(&self, model_name: &str, row: Value) -> BackendResult<i64> {
        let table = self.require_table(model_name)?;
        let Value::Object(fields) = row else {
            return Err(BackendError::SerializationError {
                message: format!("{} rows must be objects", model_name),
            });
        };

        let sql = if fields.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&table.table))
        } else {
            let columns: Vec<String> = fields.keys().map(|k| quote_ident(k)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&table.table),
                columns.join(", "),
                vec!["?"; columns.len()].join(", ")
            )
        };
        let params: Vec<SqlParam> = fields.values().map(param_from_json).collect();

        let conn = self.get_connection()?;
        let bound = to_sql_params(&params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, param_refs.as_slice())?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns a statement builder bound to this backend's date formats.
    pub fn statement_builder(&self) -> SqliteStatementBuilder<'_> {
        SqliteStatementBuilder::new(&self.duration_resolver)
    }

    fn select(
        &self,
        model_name: &str,
        table: &TableSchema,
        condition: &SqlFragment,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Record>> {
        let mut sql = format!("SELECT * FROM {}", quote_ident(&table.table));
        if !condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&condition.sql);
        }
        sql.push_str(&format!(" ORDER BY {}", quote_ident(&table.primary_key)));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        tracing::debug!(model = %model_name, sql = %sql, "SQLite query");

        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let bound = to_sql_params(&condition.params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), |row| row_to_fields(row, &columns))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Record::new(model_name, table.primary_key.clone(), row?));
        }
        Ok(records)
    }
}

fn to_sql_params(params: &[SqlParam]) -> Vec<Box<dyn rusqlite::ToSql>> {
    params
        .iter()
        .map(|p| -> Box<dyn rusqlite::ToSql> {
            match p {
                SqlParam::String(s) => Box::new(s.clone()),
                SqlParam::Integer(i) => Box::new(*i),
                SqlParam::Float(f) => Box::new(*f),
                SqlParam::Boolean(b) => Box::new(*b),
                SqlParam::Null => Box::new(rusqlite::types::Null),
            }
        })
        .collect()
}

fn param_from_json(value: &Value) -> SqlParam {
    match value {
        Value::Null => SqlParam::Null,
        Value::Bool(b) => SqlParam::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlParam::Integer(i),
            None => SqlParam::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlParam::String(s.clone()),
        other => SqlParam::String(other.to_string()),
    }
}

fn row_to_fields(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Map<String, Value>> {
    let mut fields = Map::new();
    for (i, name) in columns.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Array(b.iter().map(|&byte| Value::from(byte)).collect()),
        };
        fields.insert(name.clone(), value);
    }
    Ok(fields)
}

#[async_trait]
impl BackendAdapter for SqliteBackend {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Relational
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn associations(&self, model_name: &str) -> Vec<Association> {
        self.tables
            .read()
            .get(model_name)
            .map(TableSchema::associations)
            .unwrap_or_default()
    }

    fn compile_filter(&self, filter: &FilterSpec) -> Option<Predicate> {
        self.statement_builder()
            .to_statement(filter)
            .map(Predicate::Sql)
    }

    async fn where_(&self, model_name: &str, predicate: &Predicate) -> BackendResult<Vec<Record>> {
        let Some(fragment) = predicate.as_sql() else {
            return Err(BackendError::ForeignPredicate {
                backend_name: BACKEND_NAME.to_string(),
                predicate_kind: predicate.kind_name(),
            });
        };
        let table = self.require_table(model_name)?;

        let condition = match &table.default_scope {
            Some(scope) => SqlFragment::new(scope.clone()).and(fragment.clone()),
            None => fragment.clone(),
        };
        self.select(model_name, &table, &condition, None)
    }

    async fn children_unscoped(
        &self,
        owner: &Record,
        association: &Association,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Record>> {
        let Some(target) = association.target_class_name.as_deref() else {
            return Ok(Vec::new());
        };
        let owner_id = owner.id().ok_or_else(|| BackendError::MissingPrimaryKey {
            model_name: owner.model_name().to_string(),
        })?;
        let table = self.require_table(target)?;

        let mut condition = SqlFragment::with_params(
            format!("{} = ?", quote_ident(&association.foreign_key)),
            vec![param_from_json(owner_id)],
        );
        if let Some(foreign_type) = association.foreign_type.as_deref() {
            condition = condition.and(SqlFragment::with_params(
                format!("{} = ?", quote_ident(foreign_type)),
                vec![SqlParam::string(owner.model_name())],
            ));
        }
        self.select(target, &table, &condition, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sqlite::Reflection;
    use serde_json::json;

    fn backend() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend
            .execute_batch(
                "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT, deleted_at TEXT);
                 CREATE TABLE comments (id INTEGER PRIMARY KEY, body TEXT,
                                        commentable_id INTEGER, commentable_type TEXT);",
            )
            .unwrap();
        backend.register_table(
            TableSchema::new("Post", "posts")
                .with_default_scope("deleted_at IS NULL")
                .with_reflection(Reflection::has_many("comments", "Comment").with_as("commentable")),
        );
        backend.register_table(
            TableSchema::new("Comment", "comments")
                .with_reflection(Reflection::belongs_to_polymorphic("commentable")),
        );
        backend
    }

    #[test]
    fn test_pool_exhausted_when_connection_held() {
        let config = SqliteBackendConfig {
            connection_timeout_ms: 50,
            ..Default::default()
        };
        let backend = SqliteBackend::with_config(":memory:", config).unwrap();

        let held = backend.get_connection().unwrap();
        assert!(matches!(
            backend.get_connection(),
            Err(BackendError::PoolExhausted { .. })
        ));
        drop(held);
        assert!(backend.get_connection().is_ok());
    }

    #[test]
    fn test_backend_creation() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(backend.is_memory());
        assert_eq!(backend.kind(), AdapterKind::Relational);
        assert_eq!(backend.backend_name(), "sqlite");
    }

    #[test]
    fn test_config_defaults() {
        let config: SqliteBackendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.enable_wal);
    }

    #[test]
    fn test_insert() {
        let backend = backend();
        let id = backend
            .insert("Post", json!({"title": "Hello"}))
            .unwrap();
        assert_eq!(id, 1);
        assert!(backend.insert("Post", json!("nope")).is_err());
        assert!(matches!(
            backend.insert("Ghost", json!({})),
            Err(BackendError::UnmappedModel { .. })
        ));
    }

    #[tokio::test]
    async fn test_where_applies_default_scope() {
        let backend = backend();
        backend.insert("Post", json!({"title": "Rust"})).unwrap();
        backend
            .insert("Post", json!({"title": "Rusty", "deleted_at": "2024-01-01"}))
            .unwrap();
        backend.insert("Post", json!({"title": "Go"})).unwrap();

        let filter = FilterSpec::new("title", "string", "starts_with", "RUST");
        let predicate = backend.compile_filter(&filter).unwrap();
        let records = backend.where_("Post", &predicate).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("title"), Some(&json!("Rust")));
        assert_eq!(records[0].id(), Some(&json!(1)));

        let all = backend.where_("Post", &Predicate::all_rows()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_where_errors() {
        let backend = backend();
        let err = backend
            .where_("Post", &Predicate::all_documents())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ForeignPredicate { .. }));

        let err = backend
            .where_("Ghost", &Predicate::all_rows())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::UnmappedModel { .. }));
    }

    #[tokio::test]
    async fn test_children_unscoped() {
        let backend = backend();
        backend
            .insert("Post", json!({"id": 5, "title": "gone", "deleted_at": "2024-01-01"}))
            .unwrap();
        backend
            .insert("Comment", json!({"body": "a", "commentable_id": 5, "commentable_type": "Post"}))
            .unwrap();
        backend
            .insert("Comment", json!({"body": "b", "commentable_id": 5, "commentable_type": "Photo"}))
            .unwrap();
        backend
            .insert("Comment", json!({"body": "c", "commentable_id": 5, "commentable_type": "Post"}))
            .unwrap();

        let owner = Record::from_value("Post", "id", json!({"id": 5}));
        let association = &backend.associations("Post")[0];

        let children = backend
            .children_unscoped(&owner, association, None)
            .await
            .unwrap();
        let bodies: Vec<_> = children.iter().filter_map(|c| c.get("body")).collect();
        assert_eq!(bodies, vec![&json!("a"), &json!("c")]);

        let first = backend
            .children_unscoped(&owner, association, Some(1))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        let orphan = Record::from_value("Post", "id", json!({"title": "no id"}));
        assert!(matches!(
            backend.children_unscoped(&orphan, association, None).await,
            Err(BackendError::MissingPrimaryKey { .. })
        ));
    }
}
