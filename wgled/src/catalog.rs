//! Product to indicator table

use std::collections::HashMap;

use wgled_core::IndicatorId;
use wgled_types::ProductId;

use crate::error::{Error, Result};

/// Static mapping of products to the board output that marks their shelf
///
/// One indicator per product. Product codes are told apart from tag codes by
/// catalog lookup, and by a code prefix for codes the catalog does not know.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    prefix: String,
    indicators: HashMap<ProductId, IndicatorId>,
}

impl ProductCatalog {
    /// Default product code prefix
    pub const DEFAULT_PREFIX: &'static str = "PRD";

    /// Create an empty catalog
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            indicators: HashMap::new(),
        }
    }

    /// Register a product
    ///
    /// Rejects out-of-range indicators and indicators already used by another
    /// product.
    pub fn insert(&mut self, product: ProductId, indicator: IndicatorId) -> Result<()> {
        indicator.validate()?;

        if let Some((other, _)) = self
            .indicators
            .iter()
            .find(|(p, i)| **i == indicator && **p != product)
        {
            return Err(Error::Config(format!(
                "indicator {} already assigned to product {}",
                indicator, other
            )));
        }

        self.indicators.insert(product, indicator);
        Ok(())
    }

    /// Builder-style [`ProductCatalog::insert`]
    pub fn with_product(mut self, product: &str, indicator: u8) -> Result<Self> {
        self.insert(ProductId::new(product)?, IndicatorId::new(indicator))?;
        Ok(self)
    }

    /// Look up a scanned code
    pub fn lookup(&self, code: &str) -> Option<(&ProductId, IndicatorId)> {
        self.indicators.get_key_value(code).map(|(p, i)| (p, *i))
    }

    pub fn indicator(&self, product: &ProductId) -> Option<IndicatorId> {
        self.indicators.get(product).copied()
    }

    /// Code carries the product prefix (known to the catalog or not)
    pub fn has_product_prefix(&self, code: &str) -> bool {
        !self.prefix.is_empty() && code.starts_with(&self.prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Products sorted by code
    pub fn products(&self) -> Vec<(&ProductId, IndicatorId)> {
        let mut products: Vec<_> = self.indicators.iter().map(|(p, i)| (p, *i)).collect();
        products.sort();
        products
    }
}

impl Default for ProductCatalog {
    /// Five sample products on floors 1-5
    fn default() -> Self {
        let mut catalog = Self::new(Self::DEFAULT_PREFIX);
        for n in 1..=5u8 {
            if let Ok(product) = ProductId::new(format!("PRD{}", n)) {
                catalog.indicators.insert(product, IndicatorId::new(n));
            }
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = ProductCatalog::default();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.lookup("PRD3").map(|(_, i)| i), Some(IndicatorId::new(3)));
        assert!(catalog.lookup("PRD9").is_none());
    }

    #[test]
    fn test_prefix() {
        let catalog = ProductCatalog::default();
        assert!(catalog.has_product_prefix("PRD9"));
        assert!(!catalog.has_product_prefix("T1"));

        let bare = ProductCatalog::new("");
        assert!(!bare.has_product_prefix("PRD1"));
    }

    #[test]
    fn test_insert_rejects_bad_indicator() {
        let result = ProductCatalog::new("PRD").with_product("PRD1", 0);
        assert!(matches!(result, Err(Error::Core(_))));
    }

    #[test]
    fn test_insert_rejects_shared_indicator() {
        let result = ProductCatalog::new("PRD")
            .with_product("PRD1", 4)
            .and_then(|c| c.with_product("PRD2", 4));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_reassign_same_product() {
        let catalog = ProductCatalog::new("PRD")
            .with_product("PRD1", 4)
            .and_then(|c| c.with_product("PRD1", 6))
            .unwrap();
        assert_eq!(catalog.lookup("PRD1").map(|(_, i)| i), Some(IndicatorId::new(6)));
    }

    #[test]
    fn test_products_sorted() {
        let catalog = ProductCatalog::default();
        let codes: Vec<_> = catalog.products().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(codes, vec!["PRD1", "PRD2", "PRD3", "PRD4", "PRD5"]);
    }
}
