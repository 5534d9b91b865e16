//! Associated-children traversal.

use crate::core::{Association, AssociationKind, Record};
use crate::error::AdminResult;

use super::facade::Model;

impl Model {
    /// Visits every child record of `owner`.
    ///
    /// Has-one associations yield at most one child, has-many associations
    /// every child in backend order. Children are fetched unscoped, so records
    /// hidden by default scopes (soft deletes, visibility flags) are visited
    /// too. Belongs-to associations are not children and are skipped.
    pub async fn for_each_child<F>(&self, owner: &Record, mut visit: F) -> AdminResult<()>
    where
        F: FnMut(&Association, &Record),
    {
        for association in self.associations() {
            let limit = match association.kind {
                AssociationKind::HasOne => Some(1),
                AssociationKind::HasMany => None,
                AssociationKind::BelongsTo | AssociationKind::PolymorphicBelongsTo => continue,
            };

            let children = self
                .adapter()
                .children_unscoped(owner, &association, limit)
                .await?;
            for child in children.iter().take(limit.unwrap_or(usize::MAX)) {
                visit(&association, child);
            }
        }
        Ok(())
    }
}
