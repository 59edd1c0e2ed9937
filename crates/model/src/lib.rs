//! Core domain model for ShopSense product recommendations.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Product`: An immutable catalog entry
//! - `Category` / `ActiveCategory`: Product categories and the catalog filter
//! - `Catalog`: The ordered, validated product list
//! - `RecommendationResult`: The decoded answer of the recommendation service
//! - `SessionState`: The single state record owned by the controller

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod state;

pub use state::{Phase, RecommendationRequestState, SessionState};

/// Shown when a submission carries no usable preference text.
pub const VALIDATION_MESSAGE: &str = "Please describe what you are looking for.";

/// Shown for any failure of the remote recommendation call.
pub const SERVICE_FAILURE_MESSAGE: &str = "Something went wrong while fetching recommendations.";

/// Product identifier.
pub type ProductId = u64;

/// Category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Phone,
    Laptop,
    Headphone,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Phone, Category::Laptop, Category::Headphone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Laptop => "laptop",
            Self::Headphone => "headphone",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for category names that are not part of the fixed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "laptop" => Ok(Self::Laptop),
            "headphone" => Ok(Self::Headphone),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Catalog filter selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveCategory {
    /// Sentinel: no filtering
    #[default]
    All,
    Phone,
    Laptop,
    Headphone,
}

impl ActiveCategory {
    /// Every selectable filter, in display order.
    pub const CHOICES: [ActiveCategory; 4] = [
        ActiveCategory::All,
        ActiveCategory::Phone,
        ActiveCategory::Laptop,
        ActiveCategory::Headphone,
    ];

    /// The concrete category, or `None` for the `all` sentinel.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::All => None,
            Self::Phone => Some(Category::Phone),
            Self::Laptop => Some(Category::Laptop),
            Self::Headphone => Some(Category::Headphone),
        }
    }

    /// Whether a product of `category` passes this filter.
    pub fn admits(&self, category: Category) -> bool {
        self.category().map_or(true, |c| c == category)
    }

    pub fn as_str(&self) -> &'static str {
        self.category().map_or("all", |c| c.as_str())
    }
}

impl From<Category> for ActiveCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Phone => Self::Phone,
            Category::Laptop => Self::Laptop,
            Category::Headphone => Self::Headphone,
        }
    }
}

impl FromStr for ActiveCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Category>().map(Self::from)
    }
}

impl fmt::Display for ActiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry. Defined at startup and never mutated.
///
/// Serialized exactly as the recommendation service expects it:
/// `{ id, name, category, price, rating }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique positive identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    pub category: Category,

    /// Price in dollars
    #[serde(serialize_with = "serialize_number")]
    pub price: f64,

    /// Average rating (0.0 - 5.0)
    #[serde(serialize_with = "serialize_number")]
    pub rating: f64,
}

/// Whole amounts go out as integers (`799`, not `799.0`).
fn serialize_number<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match whole_number(*value) {
        Some(n) => serializer.serialize_u64(n),
        None => serializer.serialize_f64(*value),
    }
}

/// `value` as an integer if it is a non-negative whole number.
fn whole_number(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then(|| value as u64)
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: Category,
        price: f64,
        rating: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            price,
            rating,
        }
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product ids must be positive, got {0}")]
    InvalidId(ProductId),

    #[error("Duplicate product id: {0}")]
    DuplicateId(ProductId),

    #[error("Product {id} has a non-positive price: {price}")]
    InvalidPrice { id: ProductId, price: f64 },

    #[error("Product {id} has a rating outside 0-5: {rating}")]
    InvalidRating { id: ProductId, rating: f64 },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The immutable, ordered product list. Source of truth for identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, enforcing unique positive ids, positive prices and
    /// ratings within 0-5.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::with_capacity(products.len());

        for product in &products {
            if product.id == 0 {
                return Err(CatalogError::InvalidId(product.id));
            }
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if !(product.price > 0.0) {
                return Err(CatalogError::InvalidPrice {
                    id: product.id,
                    price: product.price,
                });
            }
            if !(0.0..=5.0).contains(&product.rating) {
                return Err(CatalogError::InvalidRating {
                    id: product.id,
                    rating: product.rating,
                });
            }
        }

        Ok(Self { products })
    }

    /// Parse a JSON array of products and validate it.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// The built-in storefront catalog.
    pub fn builtin() -> Self {
        use Category::*;

        Self {
            products: vec![
                Product::new(1, "iPhone 14", Phone, 799.0, 4.7),
                Product::new(2, "Pixel 8", Phone, 699.0, 4.6),
                Product::new(3, "Samsung Galaxy A54", Phone, 449.0, 4.4),
                Product::new(4, "Redmi Note 13", Phone, 299.0, 4.3),
                Product::new(5, "MacBook Air M2", Laptop, 1199.0, 4.8),
                Product::new(6, "Dell Inspiron 15", Laptop, 749.0, 4.2),
                Product::new(7, "Sony WH-1000XM5", Headphone, 399.0, 4.9),
                Product::new(8, "JBL Tune 510BT", Headphone, 49.0, 4.1),
            ],
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Identifiers in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.products.iter().map(|p| p.id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// Decoded answer of the recommendation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    /// Ranked identifiers, in the order the service returned them
    #[serde(default)]
    pub recommended_ids: Vec<ProductId>,
}

impl RecommendationResult {
    pub fn new(recommended_ids: Vec<ProductId>) -> Self {
        Self { recommended_ids }
    }

    /// Tolerant decode of a response body.
    ///
    /// A missing `recommendedIds` field, or one that is not an array,
    /// yields an empty list. Whole-valued floats such as `3.0` count as
    /// ids; any other element is skipped.
    pub fn from_value(body: &serde_json::Value) -> Self {
        let recommended_ids = body
            .get("recommendedIds")
            .and_then(|ids| ids.as_array())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_u64().or_else(|| id.as_f64().and_then(whole_number)))
                    .collect()
            })
            .unwrap_or_default();

        Self { recommended_ids }
    }

    /// Keep only identifiers present in `catalog`, preserving service order.
    pub fn restricted_to(self, catalog: &Catalog) -> Self {
        Self {
            recommended_ids: self
                .recommended_ids
                .into_iter()
                .filter(|id| catalog.contains(*id))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_category_from_str() {
        assert_eq!("phone".parse::<Category>().unwrap(), Category::Phone);
        assert_eq!("Laptop".parse::<Category>().unwrap(), Category::Laptop);
        assert!("tablet".parse::<Category>().is_err());

        assert_eq!("all".parse::<ActiveCategory>().unwrap(), ActiveCategory::All);
        assert_eq!(
            "headphone".parse::<ActiveCategory>().unwrap(),
            ActiveCategory::Headphone
        );
    }

    #[test]
    fn test_active_category_admits() {
        assert!(ActiveCategory::All.admits(Category::Laptop));
        assert!(ActiveCategory::Phone.admits(Category::Phone));
        assert!(!ActiveCategory::Phone.admits(Category::Headphone));
    }

    #[test]
    fn test_product_wire_format() {
        let product = Product::new(3, "Samsung Galaxy A54", Category::Phone, 449.0, 4.4);
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Samsung Galaxy A54",
                "category": "phone",
                "price": 449,
                "rating": 4.4
            })
        );
    }

    #[test]
    fn test_whole_amounts_serialize_as_integers() {
        let json = serde_json::to_string(&Product::new(8, "JBL Tune 510BT", Category::Headphone, 49.0, 4.0))
            .unwrap();
        assert!(json.contains(r#""price":49,"#));
        assert!(json.contains(r#""rating":4}"#));

        let json = serde_json::to_string(&Product::new(9, "Cable", Category::Phone, 9.99, 3.5)).unwrap();
        assert!(json.contains(r#""price":9.99,"#));
        assert!(json.contains(r#""rating":3.5}"#));

        let parsed: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.price, 9.99);
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let builtin = Catalog::builtin();
        assert_eq!(builtin.len(), 8);
        assert_eq!(builtin.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let revalidated = Catalog::new(builtin.products().to_vec()).unwrap();
        assert_eq!(revalidated, builtin);
    }

    #[test]
    fn test_catalog_rejects_bad_products() {
        let dup = vec![
            Product::new(1, "A", Category::Phone, 10.0, 4.0),
            Product::new(1, "B", Category::Phone, 10.0, 4.0),
        ];
        assert!(matches!(Catalog::new(dup), Err(CatalogError::DuplicateId(1))));

        let zero_id = vec![Product::new(0, "A", Category::Phone, 10.0, 4.0)];
        assert!(matches!(Catalog::new(zero_id), Err(CatalogError::InvalidId(0))));

        let free = vec![Product::new(1, "A", Category::Laptop, 0.0, 4.0)];
        assert!(matches!(
            Catalog::new(free),
            Err(CatalogError::InvalidPrice { id: 1, .. })
        ));

        let overrated = vec![Product::new(1, "A", Category::Laptop, 10.0, 5.5)];
        assert!(matches!(
            Catalog::new(overrated),
            Err(CatalogError::InvalidRating { id: 1, .. })
        ));
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = Catalog::from_json(
            r#"[{"id": 10, "name": "Nothing Ear", "category": "headphone", "price": 99, "rating": 4.0}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(10).unwrap().category, Category::Headphone);

        assert!(matches!(
            Catalog::from_json(r#"[{"id": 1, "name": "X", "category": "tablet", "price": 1, "rating": 1}]"#),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_result_decoding_is_tolerant() {
        assert_eq!(
            RecommendationResult::from_value(&json!({"recommendedIds": [3, 4]})).recommended_ids,
            vec![3, 4]
        );
        assert!(RecommendationResult::from_value(&json!({})).recommended_ids.is_empty());
        assert!(RecommendationResult::from_value(&json!({"recommendedIds": "x"}))
            .recommended_ids
            .is_empty());
        assert!(RecommendationResult::from_value(&json!({"recommendedIds": null}))
            .recommended_ids
            .is_empty());
        assert!(RecommendationResult::from_value(&json!([1, 2])).recommended_ids.is_empty());
        assert_eq!(
            RecommendationResult::from_value(&json!({"recommendedIds": [1, "a", 2, -4, 2.5, 3.0, -1.0]}))
                .recommended_ids,
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_result_restricted_to_catalog() {
        let result = RecommendationResult::new(vec![8, 42, 3]).restricted_to(&Catalog::builtin());
        assert_eq!(result.recommended_ids, vec![8, 3]);
    }
}
