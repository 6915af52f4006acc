use std::fmt;

/// Opaque identity of a remote resource.
///
/// The cache treats the URI as an uninterpreted string: no normalization,
/// no percent-decoding, no scheme validation. Two textually different URIs
/// are two different resources even when a resolver would consider them
/// equivalent. Syntax is checked by whichever fetcher eventually downloads
/// the resource, never here, so constructing a `ResourceUri` cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceUri(String);

impl ResourceUri {
    /// Wrap a raw URI string.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The raw string this URI was constructed from.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ResourceUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl From<&str> for ResourceUri {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
