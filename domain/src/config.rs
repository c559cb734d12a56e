//! Tunable rules for the validator.

use serde::Deserialize;

/// Validator configuration. Every field has a default, so partial overrides
/// deserialize cleanly.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Accepted final host labels, compared case-insensitively.
    pub allowed_tlds: Vec<String>,
    /// Symbols itemized individually when the encoder converts them.
    pub encoding_symbols: Vec<char>,
    /// Upper bound on the `warnings` list of a result.
    pub max_warnings: usize,
}

pub const DEFAULT_TLDS: [&str; 6] = ["com", "org", "net", "edu", "gov", "eu"];
pub const DEFAULT_ENCODING_SYMBOLS: [char; 6] = ['+', '&', '?', '#', '=', '%'];
pub const DEFAULT_MAX_WARNINGS: usize = 10;

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            allowed_tlds: DEFAULT_TLDS.iter().map(|s| s.to_string()).collect(),
            encoding_symbols: DEFAULT_ENCODING_SYMBOLS.to_vec(),
            max_warnings: DEFAULT_MAX_WARNINGS,
        }
    }
}

impl ValidatorConfig {
    /// Replace the TLD allow-list. Entries are trimmed, lowercased, stripped
    /// of a leading dot; empty ones are dropped.
    pub fn with_tlds<I, S>(mut self, tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_tlds = tlds
            .into_iter()
            .map(|t| t.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn with_max_warnings(mut self, max: usize) -> Self {
        self.max_warnings = max;
        self
    }

    pub fn is_allowed_tld(&self, tld: &str) -> bool {
        self.allowed_tlds
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(tld))
    }
}
