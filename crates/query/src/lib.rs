//! Preference validation and recommendation request construction.
//!
//! Turns raw user input into a `Preference` and pairs it with the catalog
//! to form the body sent to the recommendation service.

use serde::Serialize;
use shopsense_model::{Catalog, Product, VALIDATION_MESSAGE};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("Empty preference text")]
    Empty,
}

impl PreferenceError {
    /// Message shown inline to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Empty => VALIDATION_MESSAGE,
        }
    }
}

/// A preference that passed validation.
///
/// Holds the text verbatim; trimming is only used to decide validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference(String);

impl Preference {
    pub fn parse(text: impl Into<String>) -> Result<Self, PreferenceError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PreferenceError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Preference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Body of `POST /api/recommend`.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendRequest<'a> {
    pub preference: &'a str,
    pub products: &'a [Product],
}

impl<'a> RecommendRequest<'a> {
    /// Pair a validated preference with the full catalog.
    pub fn new(preference: &'a Preference, catalog: &'a Catalog) -> Self {
        Self {
            preference: preference.as_str(),
            products: catalog.products(),
        }
    }
}
