//! In-crate backend stub for registry and traversal tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{AdapterKind, Association, BackendAdapter, Record};
use crate::error::BackendResult;
use crate::filter::{FilterSpec, Predicate};

/// Serves canned associations and children; compiles nothing.
#[derive(Debug)]
pub(crate) struct StubAdapter {
    kind: AdapterKind,
    associations: RwLock<HashMap<String, Vec<Association>>>,
    children: RwLock<HashMap<String, Vec<Record>>>,
}

impl StubAdapter {
    pub(crate) fn new(kind: AdapterKind) -> Self {
        Self {
            kind,
            associations: RwLock::new(HashMap::new()),
            children: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn with_associations(self, model: &str, associations: Vec<Association>) -> Self {
        self.set_associations(model, associations);
        self
    }

    pub(crate) fn set_associations(&self, model: &str, associations: Vec<Association>) {
        self.associations
            .write()
            .insert(model.to_string(), associations);
    }

    /// Children returned for every owner through the named association.
    pub(crate) fn set_children(&self, association: &str, records: Vec<Record>) {
        self.children
            .write()
            .insert(association.to_string(), records);
    }
}

#[async_trait]
impl BackendAdapter for StubAdapter {
    fn kind(&self) -> AdapterKind {
        self.kind
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }

    fn associations(&self, model_name: &str) -> Vec<Association> {
        self.associations
            .read()
            .get(model_name)
            .cloned()
            .unwrap_or_default()
    }

    fn compile_filter(&self, _filter: &FilterSpec) -> Option<Predicate> {
        None
    }

    async fn where_(&self, _model_name: &str, _predicate: &Predicate) -> BackendResult<Vec<Record>> {
        Ok(Vec::new())
    }

    async fn children_unscoped(
        &self,
        _owner: &Record,
        association: &Association,
        _limit: Option<usize>,
    ) -> BackendResult<Vec<Record>> {
        Ok(self
            .children
            .read()
            .get(&association.name)
            .cloned()
            .unwrap_or_default())
    }
}
