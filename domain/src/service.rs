use tracing::{debug, info};

use crate::validate::Validator;
use crate::{Clock, CoreError, HistoryEntry, HistoryStore, ValidationResult, Verdict};

/// Application service driving the generate flow around the validator.
///
/// It owns what the browser UI used to keep as loose global state: the
/// approve/reject step for corrected URLs and the history of generated codes.
/// The validator stays pure; only this layer records anything.
pub struct QrService<H: HistoryStore, C: Clock> {
    validator: Validator,
    history: H,
    clock: C,
}

/// What the caller should do with a submitted URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Final URL, already recorded in history.
    Ready(String),
    /// The URL was corrected and the user must approve the change first.
    NeedsApproval(PendingApproval),
    /// Not usable. `suggested_url` is set when a one-click fix exists.
    Rejected {
        error: String,
        suggested_url: Option<String>,
    },
}

/// A correction awaiting the user's decision. Only the service creates these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingApproval {
    original_url: String,
    proposed_url: String,
    reasons: Vec<String>,
}

impl PendingApproval {
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn proposed_url(&self) -> &str {
        &self.proposed_url
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl<H: HistoryStore, C: Clock> QrService<H, C> {
    pub fn new(validator: Validator, history: H, clock: C) -> Self {
        Self {
            validator,
            history,
            clock,
        }
    }

    /// Validate only; nothing is recorded.
    pub fn check(&self, raw: &str) -> ValidationResult {
        self.validator.validate(raw)
    }

    /// Validate a URL for generation. Unchanged valid URLs are recorded
    /// straight away; corrected ones wait for [`QrService::decide`].
    pub fn submit(&self, raw: &str) -> Result<Submission, CoreError> {
        let result = self.validator.validate(raw);
        match result.verdict() {
            Verdict::Invalid => {
                debug!(original = %result.original_url, error = ?result.error, "submission rejected");
                Ok(Submission::Rejected {
                    error: result.error.unwrap_or_default(),
                    suggested_url: result.suggested_url,
                })
            }
            Verdict::NeedsConfirmation => Ok(Submission::NeedsApproval(pending_from(result))),
            Verdict::Canonical => {
                if result.url.as_deref() != Some(result.original_url.as_str()) {
                    return Ok(Submission::NeedsApproval(pending_from(result)));
                }
                let url = result.original_url.clone();
                self.record(&result.original_url, &url)?;
                Ok(Submission::Ready(url))
            }
        }
    }

    /// Apply the user's decision. Approval records history and returns the
    /// URL to render; rejection discards the attempt.
    pub fn decide(
        &self,
        pending: PendingApproval,
        decision: Decision,
    ) -> Result<Option<String>, CoreError> {
        match decision {
            Decision::Approve => {
                self.record(&pending.original_url, &pending.proposed_url)?;
                Ok(Some(pending.proposed_url))
            }
            Decision::Reject => {
                debug!(original = %pending.original_url, "correction rejected");
                Ok(None)
            }
        }
    }

    /// Most recent generations, newest first.
    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, CoreError> {
        self.history.recent(limit)
    }

    pub fn clear_history(&self) -> Result<(), CoreError> {
        self.history.clear()
    }

    fn record(&self, original_url: &str, encoded_url: &str) -> Result<(), CoreError> {
        self.history.record(HistoryEntry {
            timestamp: self.clock.now(),
            original_url: original_url.to_string(),
            encoded_url: encoded_url.to_string(),
        })?;
        info!(original = %original_url, encoded = %encoded_url, "generation recorded");
        Ok(())
    }
}

fn pending_from(result: ValidationResult) -> PendingApproval {
    let proposed_url = result
        .final_url()
        .unwrap_or(result.original_url.as_str())
        .to_string();
    debug!(original = %result.original_url, proposed = %proposed_url, "approval required");
    let mut reasons: Vec<String> = result.warning.into_iter().collect();
    reasons.extend(result.warnings);
    PendingApproval {
        original_url: result.original_url,
        proposed_url,
        reasons,
    }
}
