use serde::{Deserialize, Serialize};

use crate::{ActiveCategory, ProductId, SERVICE_FAILURE_MESSAGE, VALIDATION_MESSAGE};

/// Lifecycle of a recommendation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// A remote call is in flight
    Pending,
    Succeeded,
    Failed,
}

/// Renderable state of the recommendation panel.
///
/// Mutated only through the transition methods below; the controller
/// decides when each one applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequestState {
    /// Editable preference text
    pub preference_text: String,

    /// Preference as it was at the most recent valid submission
    pub last_submitted_query: String,

    pub phase: Phase,

    /// Meaningful only when `phase` is `Succeeded`
    pub recommended_ids: Vec<ProductId>,

    /// Meaningful only when `phase` is `Failed`
    pub error_message: String,
}

impl RecommendationRequestState {
    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    pub fn edit_preference(&mut self, text: impl Into<String>) {
        self.preference_text = text.into();
    }

    /// Local validation failure. Previous results stay as they were.
    pub fn reject(&mut self) {
        self.phase = Phase::Failed;
        self.error_message = VALIDATION_MESSAGE.to_string();
    }

    /// Enter `Pending` for a new submission, dropping stale results.
    pub fn start(&mut self, preference: &str) {
        self.error_message.clear();
        self.phase = Phase::Pending;
        self.recommended_ids.clear();
        self.last_submitted_query = preference.to_string();
        self.preference_text = preference.to_string();
    }

    pub fn succeed(&mut self, recommended_ids: Vec<ProductId>) {
        self.recommended_ids = recommended_ids;
        self.error_message.clear();
        self.phase = Phase::Succeeded;
    }

    pub fn fail(&mut self) {
        self.recommended_ids.clear();
        self.error_message = SERVICE_FAILURE_MESSAGE.to_string();
        self.phase = Phase::Failed;
    }
}

/// Everything the presentation layer renders, as one serializable record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub request: RecommendationRequestState,
    pub active_category: ActiveCategory,
}
