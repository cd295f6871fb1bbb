//! Document identifiers.
//!
//! Every entity is keyed by a UUIDv7. The first 48 bits carry a Unix
//! millisecond timestamp, so ordering by id is ordering by creation time.
//!
//! Callers hand us identifiers as raw strings (path segments, JSON body fields,
//! query parameters). [`parse_id`] and [`is_valid_id`] classify those strings
//! without ever panicking, so the HTTP layer can reject malformed ids before
//! touching the store.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use noteful_core::ids::new_v7;
///
/// let id = new_v7();
/// assert_eq!(id.get_version_num(), 7);
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a caller-supplied identifier.
///
/// Accepts the canonical hyphenated form as well as the other encodings the
/// `uuid` crate understands (simple, braced, urn). Surrounding whitespace is
/// not trimmed: `" <uuid>"` is not an identifier.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    if raw.is_empty() {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

/// Whether `raw` is a syntactically well-formed identifier.
///
/// ```
/// use noteful_core::ids::is_valid_id;
///
/// assert!(is_valid_id("0190a5a4-6e2b-7cc1-8e35-4b7c9d3f2a10"));
/// assert!(!is_valid_id("NOT-A-VALID-ID"));
/// assert!(!is_valid_id(""));
/// ```
#[inline]
pub fn is_valid_id(raw: &str) -> bool {
    parse_id(raw).is_some()
}
