//! Per-batch normalization context.

use std::collections::HashSet;

use pimbridge_connector::ids::{ChannelCode, RemoteCategoryId};
use pimbridge_connector::mapping::MappingCollection;
use pimbridge_connector::operation::CategoryRef;
use pimbridge_connector::types::{
    AttributeCache, CategoryStatusSnapshot, StoreView, DEFAULT_STORE_VIEW,
};

use crate::error::{NormalizeError, NormalizeResult};

/// Category creation flags chosen in the job configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFlags {
    pub is_anchor: bool,
    pub url_key: bool,
}

/// Everything a normalizer needs besides the entity itself.
///
/// Built once per batch. While a batch is processed, only the set of
/// categories created earlier in the batch grows.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    pub channel: ChannelCode,
    pub default_locale: String,
    pub default_store_view: String,
    /// Remote store views, with the PIM locale each one receives.
    pub store_views: Vec<StoreView>,
    pub attribute_cache: AttributeCache,
    pub attribute_set_id: Option<i64>,
    /// PIM category code → remote category id.
    pub category_mapping: MappingCollection,
    /// PIM attribute code → remote attribute code.
    pub attribute_mapping: MappingCollection,
    pub category_status: CategoryStatusSnapshot,
    pub flags: CategoryFlags,
    /// PIM codes of categories created earlier in the batch.
    pub pending_categories: HashSet<String>,
}

impl GlobalContext {
    /// Context with no remote data.
    pub fn new(channel: impl Into<ChannelCode>, default_locale: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            default_locale: default_locale.into(),
            default_store_view: DEFAULT_STORE_VIEW.to_string(),
            store_views: Vec::new(),
            attribute_cache: AttributeCache::new(),
            attribute_set_id: None,
            category_mapping: MappingCollection::new(),
            attribute_mapping: MappingCollection::new(),
            category_status: CategoryStatusSnapshot::new(),
            flags: CategoryFlags::default(),
            pending_categories: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_default_store_view(mut self, code: impl Into<String>) -> Self {
        self.default_store_view = code.into();
        self
    }

    #[must_use]
    pub fn with_store_views(mut self, store_views: Vec<StoreView>) -> Self {
        self.store_views = store_views;
        self
    }

    #[must_use]
    pub fn with_attribute_cache(mut self, cache: AttributeCache) -> Self {
        self.attribute_cache = cache;
        self
    }

    #[must_use]
    pub fn with_attribute_set(mut self, attribute_set_id: Option<i64>) -> Self {
        self.attribute_set_id = attribute_set_id;
        self
    }

    #[must_use]
    pub fn with_category_mapping(mut self, mapping: MappingCollection) -> Self {
        self.category_mapping = mapping;
        self
    }

    #[must_use]
    pub fn with_attribute_mapping(mut self, mapping: MappingCollection) -> Self {
        self.attribute_mapping = mapping;
        self
    }

    #[must_use]
    pub fn with_category_status(mut self, status: CategoryStatusSnapshot) -> Self {
        self.category_status = status;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: CategoryFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Record a category created earlier in the batch.
    pub fn mark_pending(&mut self, code: impl Into<String>) {
        self.pending_categories.insert(code.into());
    }

    /// Store views other than the default one that have a PIM locale.
    pub fn translated_store_views(&self) -> impl Iterator<Item = (&StoreView, &str)> {
        self.store_views
            .iter()
            .filter(move |sv| !sv.is(&self.default_store_view))
            .filter_map(|sv| sv.locale.as_deref().map(|locale| (sv, locale)))
    }

    /// Remote id mapped to a PIM category code.
    ///
    /// `Ok(None)` when the code has no explicit mapping.
    pub fn remote_category_id(&self, code: &str) -> NormalizeResult<Option<RemoteCategoryId>> {
        match self.category_mapping.target(code) {
            None => Ok(None),
            Some(target) => target.parse().map(Some).map_err(|_| {
                NormalizeError::invalid_value(
                    format!("category {code}"),
                    "mapping",
                    format!("'{target}' is not a remote category id"),
                )
            }),
        }
    }

    /// Reference to a category usable as a parent.
    ///
    /// A mapped id wins over a creation earlier in the batch. `Ok(None)` when
    /// the category is neither.
    pub fn category_ref(&self, code: &str) -> NormalizeResult<Option<CategoryRef>> {
        if let Some(id) = self.remote_category_id(code)? {
            return Ok(Some(CategoryRef::Remote { id }));
        }
        Ok(self
            .pending_categories
            .contains(code)
            .then(|| CategoryRef::Pending {
                pim_code: code.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translated_store_views_skip_default_and_unmapped() {
        let context = GlobalContext::new("ecommerce", "en_US").with_store_views(vec![
            StoreView::new(1, "default").with_locale("en_US"),
            StoreView::new(2, "fr").with_locale("fr_FR"),
            StoreView::new(3, "de"),
        ]);

        let codes: Vec<&str> = context
            .translated_store_views()
            .map(|(sv, _)| sv.code.as_str())
            .collect();
        assert_eq!(codes, vec!["fr"]);
    }

    #[test]
    fn test_remote_category_id() {
        let context = GlobalContext::new("ecommerce", "en_US").with_category_mapping(
            MappingCollection::new()
                .with("master", "2")
                .with("shoes", "")
                .with("broken", "abc"),
        );

        assert_eq!(
            context.remote_category_id("master").unwrap(),
            Some(RemoteCategoryId::new(2))
        );
        assert_eq!(context.remote_category_id("shoes").unwrap(), None);
        assert_eq!(context.remote_category_id("unknown").unwrap(), None);
        assert!(matches!(
            context.remote_category_id("broken"),
            Err(NormalizeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_category_ref_prefers_mapping() {
        let mut context = GlobalContext::new("ecommerce", "en_US")
            .with_category_mapping(MappingCollection::new().with("master", "2"));
        context.mark_pending("master");
        context.mark_pending("shoes");

        assert_eq!(
            context.category_ref("master").unwrap(),
            Some(CategoryRef::Remote {
                id: RemoteCategoryId::new(2)
            })
        );
        assert_eq!(
            context.category_ref("shoes").unwrap(),
            Some(CategoryRef::Pending {
                pim_code: "shoes".to_string()
            })
        );
        assert_eq!(context.category_ref("boots").unwrap(), None);
    }
}
