//! Canonical percent-encoding of path, query and fragment.
//!
//! Every piece is decoded once and re-encoded, so valid escapes are never
//! double-encoded and the output is a fixed point. The unescaped set is the
//! one `encodeURIComponent` uses in browsers: ASCII alphanumerics and
//! `- _ . ! ~ * ' ( )`. Query and fragment additionally keep `/` and `?`.

use crate::slashes::Components;

/// Bytes left as-is in path segments, on top of `A-Z a-z 0-9 - _ . ~`.
const PATH_KEEP: &[u8] = b"!*'()";
/// Bytes left as-is in query keys/values and the fragment.
const QUERY_KEEP: &[u8] = b"!*'()/?";

pub const ENCODED_SUMMARY: &str =
    "URL contained unencoded characters and has been properly encoded";

/// What the encoder had to change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodingReport {
    pub changed: bool,
    /// Distinct non-ASCII characters that were escaped, in order of appearance.
    pub non_ascii: Vec<char>,
    /// Configured symbols that were escaped, in configuration order.
    pub symbols: Vec<char>,
}

impl EncodingReport {
    /// Human-readable entries: a summary line, then one per character.
    pub fn warnings(&self) -> Vec<String> {
        if !self.changed {
            return Vec::new();
        }
        let mut out = vec![ENCODED_SUMMARY.to_string()];
        for c in &self.non_ascii {
            out.push(format!(
                "Special character \"{}\" was converted to \"{}\"",
                c,
                escape_char(*c)
            ));
        }
        for c in &self.symbols {
            out.push(format!(
                "Symbol \"{}\" was converted to \"{}\"",
                c,
                escape_char(*c)
            ));
        }
        out
    }
}

/// Canonicalize the path, query and fragment of `parts`. The authority is
/// returned untouched. `symbols` selects which ASCII characters get their own
/// warning entry when escaped.
pub fn canonicalize(parts: &Components, symbols: &[char]) -> (Components, EncodingReport) {
    let mut scan = Scan::default();

    let path = parts
        .path
        .split('/')
        .map(|segment| scan.piece(segment, PATH_KEEP))
        .collect::<Vec<_>>()
        .join("/");

    let query = parts.query.as_deref().map(|q| {
        q.split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => format!(
                    "{}={}",
                    scan.piece(key, QUERY_KEEP),
                    scan.piece(value, QUERY_KEEP)
                ),
                None => scan.piece(pair, QUERY_KEEP),
            })
            .collect::<Vec<_>>()
            .join("&")
    });

    let fragment = parts
        .fragment
        .as_deref()
        .map(|f| scan.piece(f, QUERY_KEEP));

    let report = EncodingReport {
        changed: scan.changed,
        symbols: symbols
            .iter()
            .copied()
            .filter(|c| scan.escaped_ascii.contains(c))
            .collect(),
        non_ascii: scan.non_ascii,
    };

    (
        Components {
            base: parts.base.clone(),
            path,
            query,
            fragment,
        },
        report,
    )
}

/// Decode once, then re-encode with `keep` left unescaped.
pub fn canonical_piece(raw: &str, keep: &[u8]) -> String {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    encode_keeping(&decoded, keep)
}

fn encode_keeping(bytes: &[u8], keep: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.split_inclusive(|b| keep.contains(b)) {
        match chunk.split_last() {
            Some((last, rest)) if keep.contains(last) => {
                out.push_str(&urlencoding::encode_binary(rest));
                out.push(char::from(*last));
            }
            _ => out.push_str(&urlencoding::encode_binary(chunk)),
        }
    }
    out
}

fn escape_char(c: char) -> String {
    let mut buf = [0u8; 4];
    urlencoding::encode(c.encode_utf8(&mut buf)).into_owned()
}

fn is_hex_triplet(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
}

/// Accumulates what changed across all pieces of one URL.
#[derive(Default)]
struct Scan {
    changed: bool,
    non_ascii: Vec<char>,
    escaped_ascii: Vec<char>,
}

impl Scan {
    fn piece(&mut self, raw: &str, keep: &[u8]) -> String {
        let canonical = canonical_piece(raw, keep);
        if canonical != raw {
            self.changed = true;
            self.note_escaped(raw, keep);
        }
        canonical
    }

    /// Record the literal characters of `raw` the encoder escaped. Valid
    /// `%XX` triplets are skipped since they only get re-cased.
    fn note_escaped(&mut self, raw: &str, keep: &[u8]) {
        let bytes = raw.as_bytes();
        let mut skip_until = 0;
        for (i, c) in raw.char_indices() {
            if i < skip_until {
                continue;
            }
            if c == '%' && is_hex_triplet(&bytes[i..]) {
                skip_until = i + 3;
                continue;
            }
            if !c.is_ascii() {
                if !self.non_ascii.contains(&c) {
                    self.non_ascii.push(c);
                }
            } else if !is_unescaped(c as u8, keep) && !self.escaped_ascii.contains(&c) {
                self.escaped_ascii.push(c);
            }
        }
    }
}

fn is_unescaped(b: u8, keep: &[u8]) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') || keep.contains(&b)
}
