//! Text rendering of the session state.
//!
//! Converts the derived views into the labels, cards and panels shown to
//! the user. Nothing here owns state; every function is a projection of a
//! `SessionState` snapshot and the catalog.

use serde::{Deserialize, Serialize};
use shopsense_catalog::{
    filter_by_category, recommended_products, CatalogSummary, RecommendedSet,
};
use shopsense_model::{ActiveCategory, Catalog, Phase, Product, RecommendationRequestState};
use std::fmt::Write;

/// A product as shown on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub id: u64,
    pub name: String,
    /// Capitalized category
    pub category: String,
    /// Formatted price, e.g. "$449"
    pub price: String,
    pub rating: f64,
    /// Whether the card carries the "AI pick" badge
    pub recommended: bool,
}

impl ProductCard {
    pub fn new(product: &Product, recommended: bool) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: capitalize(product.category.as_str()),
            price: format!("${}", product.price),
            rating: product.rating,
            recommended,
        }
    }

    /// One-line rendering.
    pub fn line(&self) -> String {
        let badge = if self.recommended { " [AI pick]" } else { "" };
        format!(
            "#{} {} | {} | {} | rating {}{}",
            self.id, self.name, self.category, self.price, self.rating, badge
        )
    }
}

/// Everything the recommendation panel displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPanel {
    pub button: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_query: Option<String>,
    /// Muted status line shown instead of cards, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub headline: String,
    pub counter: String,
    pub cards: Vec<ProductCard>,
}

impl RecommendationPanel {
    pub fn build(catalog: &Catalog, request: &RecommendationRequestState) -> Self {
        let pending = request.phase == Phase::Pending;
        let products = recommended_products(catalog, &request.recommended_ids);
        let summary = CatalogSummary::compute(catalog, &request.recommended_ids);

        let error = (!request.error_message.is_empty()).then(|| request.error_message.clone());
        let last_query =
            (!request.last_submitted_query.is_empty()).then(|| request.last_submitted_query.clone());

        let status = if pending {
            Some("Fetching recommendations…".to_string())
        } else if products.is_empty() && error.is_none() {
            Some("No results yet.".to_string())
        } else {
            None
        };

        let cards = if pending {
            Vec::new()
        } else {
            products.iter().map(|p| ProductCard::new(p, true)).collect()
        };

        Self {
            button: button_label(pending).to_string(),
            error,
            last_query,
            status,
            headline: match_headline(products.len()),
            counter: format!("Recommended {}/{}", summary.recommended, summary.total),
            cards,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.headline, self.counter);
        if let Some(query) = &self.last_query {
            let _ = writeln!(out, "Last query: {}", query);
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {}", error);
        }
        if let Some(status) = &self.status {
            let _ = writeln!(out, "{}", status);
        }
        for card in &self.cards {
            let _ = writeln!(out, "  Top match: {}", card.line());
        }
        out
    }
}

/// Label of the submit button.
pub fn button_label(pending: bool) -> &'static str {
    if pending {
        "Getting recommendations…"
    } else {
        "Get AI Recommendations"
    }
}

/// Headline summarizing the current recommendations.
pub fn match_headline(count: usize) -> String {
    if count > 0 {
        format!("{} matches", count)
    } else {
        "No active query".to_string()
    }
}

/// Label of a category chip.
pub fn category_label(category: ActiveCategory) -> String {
    match category.category() {
        None => "All products".to_string(),
        Some(c) => capitalize(c.as_str()),
    }
}

/// The chip row, with the active chip bracketed.
pub fn category_chips(active: ActiveCategory) -> String {
    ActiveCategory::CHOICES
        .iter()
        .map(|&c| {
            let label = category_label(c);
            if c == active {
                format!("[{}]", label)
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Cards of the catalog grid under the active filter.
pub fn catalog_cards(
    catalog: &Catalog,
    active: ActiveCategory,
    recommended_ids: &[u64],
) -> Vec<ProductCard> {
    let badges = RecommendedSet::new(recommended_ids);
    filter_by_category(catalog, active)
        .into_iter()
        .map(|p| ProductCard::new(p, badges.is_recommended(p)))
        .collect()
}

/// The catalog section: chips followed by one line per visible product.
pub fn render_catalog(catalog: &Catalog, active: ActiveCategory, recommended_ids: &[u64]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", category_chips(active));
    for card in catalog_cards(catalog, active, recommended_ids) {
        let _ = writeln!(out, "  {}", card.line());
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
