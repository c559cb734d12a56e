//! Domain library for the QR code generator.
//!
//! Holds the URL validation and normalization core, the result type it
//! produces, and the ports (traits) the generation flow depends on. The
//! validator itself is pure: no I/O, no shared mutable state. Keep HTTP and
//! storage concerns out of this crate.

use std::time::SystemTime;

use serde::Serialize;

/// Outcome of a single validation call.
///
/// Exactly one of three shapes holds, see [`Verdict`]. Results are only built
/// through the constructors below so that shape is always consistent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Trimmed input exactly as received.
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Parser diagnostic for structural failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub has_warnings: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The three mutually exclusive shapes of a [`ValidationResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Valid; `url` is final.
    Canonical,
    /// Valid, but `suggested_url` must be approved by the user first.
    NeedsConfirmation,
    Invalid,
}

impl ValidationResult {
    /// Valid result whose `url` needs no further confirmation. `normalized`
    /// says whether `url` differs from the input; the warnings list may be
    /// capped shorter than what was applied.
    pub fn canonical(
        original_url: String,
        url: String,
        normalized: bool,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            is_valid: true,
            url: Some(url),
            original_url,
            warning: None,
            suggested_url: None,
            error: None,
            details: None,
            has_warnings: normalized || !warnings.is_empty(),
            warnings,
        }
    }

    /// Valid result carrying a fix the caller must confirm before use.
    pub fn needs_confirmation(
        original_url: String,
        warning: impl Into<String>,
        suggested_url: String,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            is_valid: true,
            url: None,
            original_url,
            warning: Some(warning.into()),
            suggested_url: Some(suggested_url),
            error: None,
            details: None,
            has_warnings: true,
            warnings,
        }
    }

    pub fn invalid(original_url: String, error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            url: None,
            original_url,
            warning: None,
            suggested_url: None,
            error: Some(error.into()),
            details: None,
            has_warnings: false,
            warnings: Vec::new(),
        }
    }

    /// Attach a one-click correction to an invalid result.
    pub fn with_suggestion(mut self, suggested_url: String) -> Self {
        self.suggested_url = Some(suggested_url);
        self
    }

    /// Attach a parser diagnostic to an invalid result.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn verdict(&self) -> Verdict {
        match (self.is_valid, &self.url) {
            (false, _) => Verdict::Invalid,
            (true, Some(_)) => Verdict::Canonical,
            (true, None) => Verdict::NeedsConfirmation,
        }
    }

    /// The URL a caller should render once any required confirmation is given.
    pub fn final_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.suggested_url.as_deref())
    }
}

/// One successful QR generation, as kept by the history view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: SystemTime,
    pub original_url: String,
    pub encoded_url: String,
}

/// Time source abstraction to make code testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Storage port for generation history. Newest entries come first.
pub trait HistoryStore: Send + Sync {
    fn record(&self, entry: HistoryEntry) -> Result<(), CoreError>;
    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Errors raised around the validator. Validation failures themselves are
/// data in [`ValidationResult`], never a `CoreError`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("history error: {0}")]
    History(String),
}

/// Return a short about/version line.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - url validator loaded", pkg, ver)
}

pub mod adapters;
pub mod config;
pub mod encoding;
pub mod service;
pub mod slashes;
pub mod validate;

pub use config::ValidatorConfig;
pub use validate::{validate, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_follows_shape() {
        let ok = ValidationResult::canonical("a".into(), "a".into(), false, vec![]);
        assert_eq!(ok.verdict(), Verdict::Canonical);
        assert!(!ok.has_warnings);

        let capped = ValidationResult::canonical("a//b".into(), "a/b".into(), true, vec![]);
        assert!(capped.has_warnings);
        assert!(capped.warnings.is_empty());

        let confirm = ValidationResult::needs_confirmation(
            "a//".into(),
            "Double trailing slash detected",
            "a/".into(),
            vec![],
        );
        assert_eq!(confirm.verdict(), Verdict::NeedsConfirmation);
        assert_eq!(confirm.final_url(), Some("a/"));

        let bad = ValidationResult::invalid("x".into(), "nope");
        assert_eq!(bad.verdict(), Verdict::Invalid);
        assert_eq!(bad.final_url(), None);
    }

    #[test]
    fn serializes_camel_case_and_skips_empty() {
        let r = ValidationResult::invalid("a b".into(), "spaces")
            .with_suggestion("a%20b".into());
        let v = serde_json::to_value(&r).expect("serialize");
        assert_eq!(v["isValid"], false);
        assert_eq!(v["originalUrl"], "a b");
        assert_eq!(v["suggestedUrl"], "a%20b");
        assert!(v.get("url").is_none());
        assert!(v.get("warnings").is_none());
    }

    #[test]
    fn core_error_display() {
        assert_eq!(
            CoreError::History("mutex poisoned".into()).to_string(),
            "history error: mutex poisoned"
        );
    }
}
