//! Derived catalog views.
//!
//! Provides pure functions over an immutable `Catalog`:
//! - Category filtering for the catalog grid
//! - The recommended product list (catalog order, unknown ids dropped)
//! - Recommendation badges and counters

use serde::Serialize;
use shopsense_model::{ActiveCategory, Catalog, Product, ProductId};
use std::collections::HashSet;

/// Products admitted by `active`, in catalog order.
///
/// `ActiveCategory::All` returns the whole catalog.
pub fn filter_by_category(catalog: &Catalog, active: ActiveCategory) -> Vec<&Product> {
    catalog
        .iter()
        .filter(|p| active.admits(p.category))
        .collect()
}

/// Catalog entries whose id appears in `recommended_ids`.
///
/// Output follows catalog order, not the service's ranking. Ids with no
/// catalog entry are ignored.
pub fn recommended_products<'a>(
    catalog: &'a Catalog,
    recommended_ids: &[ProductId],
) -> Vec<&'a Product> {
    let wanted = RecommendedSet::new(recommended_ids);
    catalog.iter().filter(|p| wanted.contains(p.id)).collect()
}

/// Set of recommended ids, for badging cards in the catalog grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendedSet {
    ids: HashSet<ProductId>,
}

impl RecommendedSet {
    pub fn new(recommended_ids: &[ProductId]) -> Self {
        Self {
            ids: recommended_ids.iter().copied().collect(),
        }
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_recommended(&self, product: &Product) -> bool {
        self.contains(product.id)
    }
}

/// Counters shown next to the preference box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Products in the catalog
    pub total: usize,
    /// Recommended products that exist in the catalog
    pub recommended: usize,
}

impl CatalogSummary {
    pub fn compute(catalog: &Catalog, recommended_ids: &[ProductId]) -> Self {
        Self {
            total: catalog.len(),
            recommended: recommended_products(catalog, recommended_ids).len(),
        }
    }
}
