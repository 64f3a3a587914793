//! Category normalization.

use pimbridge_connector::ids::RemoteCategoryId;
use pimbridge_connector::operation::{
    CategoryCreate, CategoryData, CategoryMove, CategoryRef, CategoryUpdate, CategoryVariation,
};

use super::context::GlobalContext;
use super::{EntityNormalizer, NormalizedEntity, NormalizerKey};
use crate::catalog::{CatalogEntity, CategoryNode};
use crate::error::{NormalizeError, NormalizeResult};
use crate::operations::NormalizedOperationSet;

/// Turns a PIM category into remote category operations.
///
/// A category mapped to a remote id that still exists is updated (and moved
/// when its remote parent changed); any other category is created under its
/// parent. The parent is either mapped or created earlier in the same batch.
/// Each translated store view with a label gets a variation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryNormalizer;

impl CategoryNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one non-root category.
    pub fn normalize_category(
        &self,
        category: &CategoryNode,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedOperationSet> {
        let parent = category.parent().ok_or_else(|| {
            NormalizeError::invalid_value(
                format!("category {}", category.code),
                "parent",
                "tree roots are not exported",
            )
        })?;

        let parent_ref = context.category_ref(&parent.code)?.ok_or_else(|| {
            NormalizeError::CategoryNotMapped {
                code: category.code.clone(),
                parent_code: parent.code.clone(),
            }
        })?;

        let label = category.label(&context.default_locale);
        let mut data = CategoryData::new(label.as_str());
        data.is_anchor = context.flags.is_anchor;
        data.position = category.position;
        if context.flags.url_key {
            data.url_key = Some(url_key(&label, &category.code));
        }

        let mut operations = NormalizedOperationSet::new();
        let reference = match self.existing_remote_id(category, context)? {
            Some(id) => {
                let current_parent = context
                    .category_status
                    .get(id)
                    .and_then(|remote| remote.parent_id);
                if current_parent.is_none() || current_parent != parent_ref.remote_id() {
                    operations.moves.push(CategoryMove {
                        pim_code: category.code.clone(),
                        id,
                        parent: parent_ref,
                    });
                }
                operations.updates.push(CategoryUpdate {
                    pim_code: category.code.clone(),
                    id,
                    store_view: context.default_store_view.clone(),
                    data,
                });
                CategoryRef::Remote { id }
            }
            None => {
                operations.creates.push(CategoryCreate {
                    pim_code: category.code.clone(),
                    parent: parent_ref,
                    store_view: context.default_store_view.clone(),
                    data,
                });
                CategoryRef::Pending {
                    pim_code: category.code.clone(),
                }
            }
        };

        for (store_view, locale) in context.translated_store_views() {
            let Some(name) = category.translation(locale) else {
                continue;
            };
            operations.variations.push(CategoryVariation {
                category: reference.clone(),
                store_view: store_view.code.clone(),
                name: name.to_string(),
                url_key: context
                    .flags
                    .url_key
                    .then(|| url_key(name, &category.code)),
            });
        }

        Ok(operations)
    }

    /// Remote id of the category when it is mapped and still exists remotely.
    fn existing_remote_id(
        &self,
        category: &CategoryNode,
        context: &GlobalContext,
    ) -> NormalizeResult<Option<RemoteCategoryId>> {
        Ok(context
            .remote_category_id(&category.code)?
            .filter(|id| context.category_status.contains(*id)))
    }
}

impl EntityNormalizer for CategoryNormalizer {
    fn key(&self) -> NormalizerKey {
        NormalizerKey::Category
    }

    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity> {
        match entity {
            CatalogEntity::Category(category) => self
                .normalize_category(category, context)
                .map(NormalizedEntity::Category),
            other => Err(self.unsupported(other)),
        }
    }
}

/// URL key from a label; falls back to the code for labels with no
/// alphanumeric characters.
pub(crate) fn url_key(label: &str, code: &str) -> String {
    let slug = slugify(label);
    if slug.is_empty() {
        slugify(code)
    } else {
        slug
    }
}

fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
