//! Attribute option normalization.

use pimbridge_connector::operation::OptionPayload;

use super::context::GlobalContext;
use super::{store_labels, EntityNormalizer, NormalizedEntity, NormalizerKey};
use crate::catalog::{AttributeOption, CatalogEntity};
use crate::error::{NormalizeError, NormalizeResult};

/// Turns a PIM attribute option into a remote option with one label per
/// store view.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionNormalizer;

impl OptionNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_option(
        &self,
        option: &AttributeOption,
        context: &GlobalContext,
    ) -> NormalizeResult<OptionPayload> {
        if option.code.trim().is_empty() {
            return Err(NormalizeError::missing_field(
                format!("option of {}", option.attribute),
                "code",
            ));
        }

        Ok(OptionPayload {
            attribute_code: context
                .attribute_mapping
                .target_or_source(&option.attribute)
                .to_string(),
            option_code: option.code.clone(),
            labels: store_labels(context, &option.code, |locale| option.label(locale)),
            order: option.sort_order,
        })
    }
}

impl EntityNormalizer for OptionNormalizer {
    fn key(&self) -> NormalizerKey {
        NormalizerKey::Option
    }

    fn normalize(
        &self,
        entity: &CatalogEntity,
        context: &GlobalContext,
    ) -> NormalizeResult<NormalizedEntity> {
        match entity {
            CatalogEntity::Option(option) => self
                .normalize_option(option, context)
                .map(NormalizedEntity::Option),
            other => Err(self.unsupported(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pimbridge_connector::mapping::MappingCollection;
    use pimbridge_connector::operation::StoreLabel;
    use pimbridge_connector::types::StoreView;

    #[test]
    fn test_option_labels_per_store_view() {
        let context = GlobalContext::new("ecommerce", "en_US")
            .with_store_views(vec![
                StoreView::new(1, "default").with_locale("en_US"),
                StoreView::new(2, "fr").with_locale("fr_FR"),
            ])
            .with_attribute_mapping(MappingCollection::new().with("main_color", "color"));
        let mut option = AttributeOption::new("main_color", "red")
            .with_label("en_US", "Red")
            .with_label("fr_FR", "Rouge");
        option.sort_order = 3;

        let payload = OptionNormalizer::new()
            .normalize_option(&option, &context)
            .unwrap();

        assert_eq!(payload.attribute_code, "color");
        assert_eq!(payload.order, 3);
        assert_eq!(
            payload.labels,
            vec![
                StoreLabel {
                    store_id: 0,
                    value: "red".to_string()
                },
                StoreLabel {
                    store_id: 1,
                    value: "Red".to_string()
                },
                StoreLabel {
                    store_id: 2,
                    value: "Rouge".to_string()
                },
            ]
        );
    }
}
