use crate::short_key::ShortKey;

/// A link as it is written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Key derived from the lowercased URL.
    pub short_key: ShortKey,
    /// The URL exactly as it was submitted.
    pub original_url: String,
}

impl LinkRecord {
    /// Builds the record for a submitted URL, deriving its key.
    pub fn from_url(original_url: impl Into<String>) -> Self {
        let original_url = original_url.into();
        Self {
            short_key: ShortKey::derive(&original_url),
            original_url,
        }
    }
}
