use md5::{Digest, Md5};
use std::fmt::Display;

/// Length of a derived key: an MD5 digest rendered as lowercase hex.
pub const KEY_LENGTH: usize = 32;

/// A lookup key for a shortened URL.
///
/// Keys are derived from the URL itself, so submitting the same URL twice
/// always yields the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShortKey(String);

impl ShortKey {
    /// Derives the key for `url`.
    ///
    /// The URL is lowercased before hashing, so `HTTP://Example.com` and
    /// `http://example.com` share a key. The stored value is never touched by
    /// this normalization.
    ///
    /// Lowercasing maps each character on its own and keeps one character
    /// per input character, so keys match those already written to a shared
    /// `links` table by earlier deployments.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashlink_core::ShortKey;
    ///
    /// let key = ShortKey::derive("http://test.com");
    /// assert_eq!(key.as_str(), "1aa0d4413384d91bc0d452f03b505298");
    /// ```
    pub fn derive(url: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(lowercase_per_char(url).as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps a key taken from an untrusted source (e.g. a request path)
    /// without validation.
    ///
    /// A malformed key is not an error: it simply never matches a stored link.
    pub fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns true if the key has the shape of a derived key.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == KEY_LENGTH
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lowercases `s` one character at a time, without context-sensitive rules
/// (a final `Σ` becomes `σ`) and without expansions (`İ` becomes `i`).
fn lowercase_per_char(s: &str) -> String {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

impl Display for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
