//! Classification of single path segments.

use lazy_static::lazy_static;
use regex::Regex;

/// Highest numeric segment still treated as an array index.
pub const MAX_ARRAY_INDEX: u64 = 1000;

/// Sequences at or below this length are never converted for being sparse.
pub const SPARSE_MIN_LENGTH: usize = 50;

lazy_static! {
    // Keys that read like sentences rather than structured paths.
    static ref LITERAL_SENTENCE_REGEX: Regex = Regex::new(r"( |,|\?)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A non-negative integer without leading zero, at most [`MAX_ARRAY_INDEX`].
    Index(usize),
    /// Anything else, including `"01"`, `"1001"`, `"-1"` and `""`.
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Seq,
    Map,
}

/// Classifies one segment. Evaluated per occurrence; the same text may be an
/// index in one branch and a key in another depending on its container.
pub fn classify_segment(segment: &str) -> SegmentKind {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return SegmentKind::Key;
    }
    let has_leading_zero = segment.len() > 1 && segment.starts_with('0');
    if has_leading_zero {
        return SegmentKind::Key;
    }
    match segment.parse::<u64>() {
        Ok(n) if n <= MAX_ARRAY_INDEX => SegmentKind::Index(n as usize),
        // too high, or too long to fit
        _ => SegmentKind::Key,
    }
}

/// The container a parent should create for a child whose own child is `next`.
pub fn container_for(next: &str) -> ContainerKind {
    match classify_segment(next) {
        SegmentKind::Index(_) => ContainerKind::Seq,
        SegmentKind::Key => ContainerKind::Map,
    }
}

/// Splits a path key into segments.
///
/// With `preserve_literal_dots`, a key containing a space, comma or question
/// mark is kept whole: such keys are natural-language sentences.
pub fn split_key(key: &str, preserve_literal_dots: bool) -> Vec<&str> {
    if preserve_literal_dots && LITERAL_SENTENCE_REGEX.is_match(key) {
        vec![key]
    } else {
        key.split('.').collect()
    }
}
