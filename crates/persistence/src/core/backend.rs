//! Backend abstraction.
//!
//! This module defines the [`BackendAdapter`] trait, the capability interface
//! every persistence technology implements so the model facade can filter,
//! introspect and traverse its data without knowing which store it talks to.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;
use crate::filter::{FilterSpec, Predicate};

use super::association::Association;
use super::record::Record;

/// Identifies the family of persistence technology behind a model.
///
/// Models are grouped by adapter kind for registry filtering and for the
/// polymorphic parent index, which is built separately per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Relational store (tables, rows, SQL predicates).
    Relational,
    /// Document store (collections, JSON documents, operator documents).
    Document,
}

impl AdapterKind {
    /// Returns every adapter kind.
    pub fn all() -> [AdapterKind; 2] {
        [AdapterKind::Relational, AdapterKind::Document]
    }

    /// Returns the lowercase name used in logs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Relational => "relational",
            AdapterKind::Document => "document",
        }
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A backend that can compile filters, describe associations and fetch records.
///
/// A [`Model`](crate::model::Model) holds an `Arc<dyn BackendAdapter>` for its
/// kind. Association metadata is read from the backend on every call; the
/// facade never caches it.
#[async_trait]
pub trait BackendAdapter: Send + Sync + Debug {
    /// Returns the adapter kind served by this backend.
    fn kind(&self) -> AdapterKind;

    /// Returns a short backend name for diagnostics.
    fn backend_name(&self) -> &'static str;

    /// Returns the associations declared by a model, in declaration order.
    ///
    /// Models unknown to the backend have no associations.
    fn associations(&self, model_name: &str) -> Vec<Association>;

    /// Compiles one filter into a predicate for this backend.
    ///
    /// `None` means the filter places no constraint (discarded, blank or
    /// malformed input).
    fn compile_filter(&self, filter: &FilterSpec) -> Option<Predicate>;

    /// Returns the records of a model matching a predicate, with the model's
    /// default scope applied.
    async fn where_(&self, model_name: &str, predicate: &Predicate) -> BackendResult<Vec<Record>>;

    /// Returns the records reachable from `owner` through `association`,
    /// bypassing default scopes.
    ///
    /// At most `limit` records are returned when a limit is given.
    async fn children_unscoped(
        &self,
        owner: &Record,
        association: &Association,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Record>>;
}
