//! URL component splitting and duplicate-slash repair.
//!
//! Repairs work on the raw input text rather than on a re-serialized parse
//! so that untouched parts of the URL come back byte-for-byte.

use std::sync::OnceLock;

use regex::Regex;

fn components_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(https?://[^/?#]+)([^?#]*)(\?[^#]*)?(#.*)?$")
            .expect("component pattern compiles")
    })
}

/// A URL cut into `scheme://authority`, path, query and fragment. The query
/// and fragment are stored without their `?` / `#` delimiters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Components {
    pub base: String,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Components {
    /// Split a URL. Returns `None` when there is no `http(s)://authority`
    /// prefix to anchor on.
    pub fn split(url: &str) -> Option<Self> {
        let caps = components_regex().captures(url)?;
        Some(Self {
            base: caps.get(1)?.as_str().to_string(),
            path: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            query: caps.get(3).map(|m| m.as_str()[1..].to_string()),
            fragment: caps.get(4).map(|m| m.as_str()[1..].to_string()),
        })
    }

    /// Host text as typed: the authority without userinfo and port.
    pub fn host(&self) -> &str {
        let authority = self
            .base
            .split_once("://")
            .map_or(self.base.as_str(), |(_, a)| a);
        let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        host_port.split_once(':').map_or(host_port, |(h, _)| h)
    }

    /// Reassemble in original order. `split` followed by `join` is lossless.
    pub fn join(&self) -> String {
        let mut out = String::with_capacity(
            self.base.len()
                + self.path.len()
                + self.query.as_ref().map_or(0, |q| q.len() + 1)
                + self.fragment.as_ref().map_or(0, |f| f.len() + 1),
        );
        out.push_str(&self.base);
        out.push_str(&self.path);
        if let Some(q) = &self.query {
            out.push('?');
            out.push_str(q);
        }
        if let Some(f) = &self.fragment {
            out.push('#');
            out.push_str(f);
        }
        out
    }

    /// The component the URL ends with.
    fn last_mut(&mut self) -> &mut String {
        if let Some(f) = self.fragment.as_mut() {
            f
        } else if let Some(q) = self.query.as_mut() {
            q
        } else {
            &mut self.path
        }
    }
}

/// Which slash repairs were applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlashFixes {
    /// A run of two or more slashes ended the whole URL.
    pub trailing: bool,
    /// The path contained a run of two or more slashes before its end.
    pub interior: bool,
}

impl SlashFixes {
    pub fn any(&self) -> bool {
        self.trailing || self.interior
    }
}

/// Collapse duplicate slashes in place.
///
/// A trailing run is collapsed in whichever component ends the URL, so a run
/// after `?` or `#` is fixed without touching the path. Interior runs are
/// only collapsed inside the path.
pub fn normalize(parts: &mut Components) -> SlashFixes {
    let mut fixes = SlashFixes::default();

    let last = parts.last_mut();
    if last.ends_with("//") {
        let kept = last.trim_end_matches('/').len();
        last.truncate(kept);
        last.push('/');
        fixes.trailing = true;
    }

    if parts.path.contains("//") {
        parts.path = collapse_runs(&parts.path);
        fixes.interior = true;
    }

    fixes
}

fn collapse_runs(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
