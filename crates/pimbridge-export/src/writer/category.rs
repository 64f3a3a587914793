//! Category operation writer.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use pimbridge_connector::config::ConnectionParameters;
use pimbridge_connector::error::ConnectorError;
use pimbridge_connector::ids::RemoteCategoryId;
use pimbridge_connector::mapping::MappingEntry;
use pimbridge_connector::operation::CategoryRef;
use pimbridge_connector::traits::RemoteCatalogService;

use crate::error::ExportResult;
use crate::mapper::MappingMerger;
use crate::operations::NormalizedOperationSet;

/// Counts of the operations a [`CategoryWriter`] sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryWriteReport {
    /// Created categories with their new remote id, in creation order.
    pub created: Vec<(String, RemoteCategoryId)>,
    pub updated: usize,
    pub moved: usize,
    pub variations: usize,
}

/// Sends category operations and records created categories in the
/// category mapping.
///
/// Operations are sent bucket by bucket: creations, updates, moves, then
/// variations. Creations run in batch order, so a category created under a
/// parent created in the same batch gets the parent's new id. Moves and
/// variations resolve pending categories the same way.
pub struct CategoryWriter {
    remote: Arc<dyn RemoteCatalogService>,
    category_mapping: Arc<MappingMerger>,
    connection: ConnectionParameters,
}

impl CategoryWriter {
    pub fn new(
        remote: Arc<dyn RemoteCatalogService>,
        category_mapping: Arc<MappingMerger>,
        connection: ConnectionParameters,
    ) -> Self {
        Self {
            remote,
            category_mapping,
            connection,
        }
    }

    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn write(
        &self,
        operations: &NormalizedOperationSet,
    ) -> ExportResult<CategoryWriteReport> {
        let mut report = CategoryWriteReport::default();
        let mut created: HashMap<String, RemoteCategoryId> = HashMap::new();

        for create in &operations.creates {
            let parent_id = resolve(&created, &create.parent)?;
            let id = self.remote.create_category(parent_id, create).await?;
            debug!(category_code = %create.pim_code, remote_id = %id, "Category created");
            created.insert(create.pim_code.clone(), id);
            report.created.push((create.pim_code.clone(), id));
        }
        self.record_created(&report.created).await?;

        for update in &operations.updates {
            self.remote.update_category(update).await?;
            report.updated += 1;
        }

        for category_move in &operations.moves {
            let parent_id = resolve(&created, &category_move.parent)?;
            self.remote.move_category(parent_id, category_move).await?;
            report.moved += 1;
        }

        for variation in &operations.variations {
            let id = resolve(&created, &variation.category)?;
            self.remote.update_category_variation(id, variation).await?;
            report.variations += 1;
        }

        info!(
            created = report.created.len(),
            updated = report.updated,
            moved = report.moved,
            variations = report.variations,
            "Categories written"
        );

        Ok(report)
    }

    async fn record_created(&self, created: &[(String, RemoteCategoryId)]) -> ExportResult<()> {
        if created.is_empty() {
            return Ok(());
        }

        let mut mapping = self
            .category_mapping
            .mapping(&self.connection)
            .await?
            .into_inner_or_default();
        for (code, id) in created {
            mapping.add(MappingEntry::new(code.as_str(), id.to_string()));
        }

        if self
            .category_mapping
            .set_mapping(&self.connection, &mapping)
            .await?
            .is_invalid_credentials()
        {
            return Err(ConnectorError::AuthenticationFailed {
                connection_id: self.connection.identifier(),
            }
            .into());
        }
        Ok(())
    }
}

/// Remote id of a category, looking pending ones up among this batch's
/// creations.
fn resolve(
    created: &HashMap<String, RemoteCategoryId>,
    category: &CategoryRef,
) -> ExportResult<RemoteCategoryId> {
    match category {
        CategoryRef::Remote { id } => Ok(*id),
        CategoryRef::Pending { pim_code } => created.get(pim_code).copied().ok_or_else(|| {
            ConnectorError::InvalidData {
                message: format!("category '{pim_code}' is not created in this batch"),
            }
            .into()
        }),
    }
}
