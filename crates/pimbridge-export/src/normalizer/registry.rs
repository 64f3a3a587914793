//! Normalizer lookup by key.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    AttributeNormalizer, CategoryNormalizer, EntityNormalizer, FamilyNormalizer, NormalizerKey,
    OptionNormalizer, ProductCreateNormalizer, ProductUpdateNormalizer,
};
use crate::error::{NormalizeError, NormalizeResult};

/// Normalizers registered by key.
#[derive(Clone, Default)]
pub struct NormalizerRegistry {
    normalizers: HashMap<NormalizerKey, Arc<dyn EntityNormalizer>>,
}

impl NormalizerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in normalizer of every key.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ProductCreateNormalizer::new()));
        registry.register(Arc::new(ProductUpdateNormalizer::new()));
        registry.register(Arc::new(CategoryNormalizer::new()));
        registry.register(Arc::new(FamilyNormalizer::new()));
        registry.register(Arc::new(OptionNormalizer::new()));
        registry.register(Arc::new(AttributeNormalizer::new()));
        registry
    }

    /// Register a normalizer under its own key, replacing any previous one.
    pub fn register(&mut self, normalizer: Arc<dyn EntityNormalizer>) {
        self.normalizers.insert(normalizer.key(), normalizer);
    }

    /// Get the normalizer registered for a key.
    pub fn get(&self, key: NormalizerKey) -> NormalizeResult<Arc<dyn EntityNormalizer>> {
        self.normalizers
            .get(&key)
            .cloned()
            .ok_or_else(|| NormalizeError::UnknownNormalizer {
                key: key.to_string(),
            })
    }

    /// Get a normalizer by its string key.
    pub fn get_by_key(&self, key: &str) -> NormalizeResult<Arc<dyn EntityNormalizer>> {
        self.get(key.parse()?)
    }

    /// Check if a key is registered.
    pub fn contains(&self, key: NormalizerKey) -> bool {
        self.normalizers.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.normalizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalizers.is_empty()
    }
}

impl std::fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.normalizers.keys().map(NormalizerKey::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("NormalizerRegistry")
            .field("keys", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntity, Family};
    use crate::normalizer::{GlobalContext, NormalizedEntity};

    #[test]
    fn test_defaults_register_every_key() {
        let registry = NormalizerRegistry::with_defaults();
        assert_eq!(registry.len(), NormalizerKey::ALL.len());
        for key in NormalizerKey::ALL {
            assert_eq!(registry.get(key).unwrap().key(), key);
        }
    }

    #[test]
    fn test_absent_key_is_an_error() {
        let registry = NormalizerRegistry::new();
        assert!(registry.is_empty());

        let err = registry.get(NormalizerKey::Family).err().unwrap();
        assert_eq!(err.to_string(), "Normalizer \"family\" unknown");
    }

    #[test]
    fn test_lookup_by_string_key() {
        let registry = NormalizerRegistry::with_defaults();
        let normalizer = registry.get_by_key("family").unwrap();

        let context = GlobalContext::new("ecommerce", "en_US").with_attribute_set(Some(4));
        let normalized = normalizer
            .normalize(&CatalogEntity::Family(Family::new("shoes")), &context)
            .unwrap();
        assert!(matches!(normalized, NormalizedEntity::Family(ref p) if p.name == "shoes"));

        assert!(matches!(
            registry.get_by_key("widget").err(),
            Some(NormalizeError::UnknownNormalizer { .. })
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = NormalizerRegistry::new();
        registry.register(Arc::new(FamilyNormalizer::new()));
        registry.register(Arc::new(FamilyNormalizer::new()));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(NormalizerKey::Family));
        assert!(!registry.contains(NormalizerKey::Category));
    }
}
