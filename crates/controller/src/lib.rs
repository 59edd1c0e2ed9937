//! Recommendation request lifecycle.
//!
//! `RecommendationController` owns the `SessionState` and is the only
//! place it changes. A submission moves the request through
//! `Idle/… -> Pending -> Succeeded | Failed`; the catalog filter is
//! updated independently.

use parking_lot::Mutex;
use shopsense_client::{RecommendationService, ServiceError};
use shopsense_model::{ActiveCategory, Catalog, Phase, RecommendationResult, SessionState};
use shopsense_query::{Preference, PreferenceError, RecommendRequest};

/// How settlements of overlapping submissions are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Whichever settlement arrives last wins, even a stale one.
    #[default]
    LastWriteWins,
    /// Only the most recently issued submission may write its outcome.
    LatestSubmission,
}

/// Ticket for a submission that passed validation and entered `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    sequence: u64,
    preference: Preference,
}

impl Submission {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn preference(&self) -> &Preference {
        &self.preference
    }
}

/// What a call to `submit` or `settle` did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The outcome was written; the request is now in this phase.
    Applied(Phase),
    /// A newer submission exists, so this outcome was dropped.
    Superseded { sequence: u64, latest: u64 },
    /// The preference was blank; no call was made.
    Rejected,
}

#[derive(Debug, Default)]
struct Inner {
    session: SessionState,
    /// Sequence number of the latest submission handed out
    issued: u64,
}

/// Owns the session state and drives recommendation requests.
pub struct RecommendationController<S> {
    catalog: Catalog,
    service: S,
    policy: ResolutionPolicy,
    inner: Mutex<Inner>,
}

impl<S> RecommendationController<S> {
    pub fn new(catalog: Catalog, service: S) -> Self {
        Self {
            catalog,
            service,
            policy: ResolutionPolicy::default(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.lock().session.clone()
    }

    pub fn edit_preference(&self, text: impl Into<String>) {
        self.inner.lock().session.request.edit_preference(text);
    }

    pub fn set_active_category(&self, category: ActiveCategory) {
        tracing::debug!(category = %category, "Active category changed");
        self.inner.lock().session.active_category = category;
    }

    /// Validate `preference` and, if usable, enter `Pending`.
    ///
    /// A blank preference sets the validation error and leaves earlier
    /// results in place. It does not consume a sequence number.
    pub fn begin(&self, preference: &str) -> Result<Submission, PreferenceError> {
        let mut inner = self.inner.lock();

        let preference = match Preference::parse(preference) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected submission");
                inner.session.request.reject();
                return Err(e);
            }
        };

        inner.issued += 1;
        let sequence = inner.issued;
        inner.session.request.start(preference.as_str());

        tracing::info!(sequence, preference = %preference.as_str(), "Submitted preference");

        Ok(Submission {
            sequence,
            preference,
        })
    }

    /// Apply the outcome of the remote call for `submission`.
    pub fn settle(
        &self,
        submission: Submission,
        outcome: Result<RecommendationResult, ServiceError>,
    ) -> Settled {
        let mut inner = self.inner.lock();

        if self.policy == ResolutionPolicy::LatestSubmission && submission.sequence != inner.issued
        {
            tracing::debug!(
                sequence = submission.sequence,
                latest = inner.issued,
                "Discarding stale recommendation outcome"
            );
            return Settled::Superseded {
                sequence: submission.sequence,
                latest: inner.issued,
            };
        }

        let request = &mut inner.session.request;
        match outcome {
            Ok(result) => {
                let received = result.recommended_ids.len();
                let result = result.restricted_to(&self.catalog);
                if result.recommended_ids.len() != received {
                    tracing::debug!(
                        sequence = submission.sequence,
                        dropped = received - result.recommended_ids.len(),
                        "Ignoring ids missing from the catalog"
                    );
                }
                tracing::info!(
                    sequence = submission.sequence,
                    count = result.recommended_ids.len(),
                    "Recommendations received"
                );
                request.succeed(result.recommended_ids);
            }
            Err(e) => {
                tracing::warn!(sequence = submission.sequence, error = %e, "Recommendation request failed");
                request.fail();
            }
        }

        Settled::Applied(request.phase)
    }
}

impl<S: RecommendationService> RecommendationController<S> {
    /// Submit `preference`: validate, call the service once, settle.
    pub async fn submit(&self, preference: &str) -> Settled {
        let submission = match self.begin(preference) {
            Ok(s) => s,
            Err(_) => return Settled::Rejected,
        };

        let request = RecommendRequest::new(submission.preference(), &self.catalog);
        tracing::debug!(service = self.service.name(), "Calling recommendation service");
        let outcome = self.service.recommend(&request).await;

        self.settle(submission, outcome)
    }

    /// Submit whatever is currently in the preference box.
    pub async fn submit_current(&self) -> Settled {
        let text = self.inner.lock().session.request.preference_text.clone();
        self.submit(&text).await
    }
}
