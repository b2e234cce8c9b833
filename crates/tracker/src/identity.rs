//! Document identity derivation
//!
//! Annotation collections are keyed by an opaque string identity. For
//! editor URLs the identity is the post slug or draft number; anything
//! unrecognized falls back to a hash of the whole URL so the key is still
//! stable across reloads of the same address.

use regex_lite::Regex;

/// Opaque key identifying which document an annotation collection belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentIdentity(String);

impl DocumentIdentity {
    /// Wrap an externally derived key; `None` when the key is empty
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Derive an identity from an editor URL.
    ///
    /// Published posts (`.../p/<slug>`, with or without a trailing `/edit`)
    /// use the slug; draft editing URLs (`.../publish/post/<id>`) use the
    /// numeric id; everything else uses a hash of the full URL.
    pub fn from_url(url: &str) -> Self {
        if let Ok(re) = Regex::new(r"/p/([^/?#]+)") {
            if let Some(slug) = re.captures(url).and_then(|c| c.get(1)) {
                return Self(slug.as_str().to_string());
            }
        }
        if let Ok(re) = Regex::new(r"/publish/post/(\d+)") {
            if let Some(id) = re.captures(url).and_then(|c| c.get(1)) {
                return Self(id.as_str().to_string());
            }
        }
        Self(url_hash(url).to_string())
    }

    /// The identity as a storage key component
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 32-bit string hash over UTF-16 code units: `h = h * 31 + unit` with
/// wrapping arithmetic, absolute value. Matches the key derivation earlier
/// saves were made under, so existing records stay reachable.
pub fn url_hash(s: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in s.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}
