// ============================================================================
// spark-query-sync - Key Naming
// Camel-case joining of nested keys and the matching segment splitter
// ============================================================================
//
// `user` + `address` + `city` is encoded as `userAddressCity`. Splitting
// takes runs of a capital followed by lowercase letters, runs of lowercase
// letters, and runs of digits. That only inverts the join for simple
// lower-camel-case names; anything else (acronyms, single capitals,
// underscores, non-ASCII letters) is reported as ambiguous instead of
// being mis-split. A digit run is an array index only when more of the
// path follows it: `rows0Name` is `rows[0].name`, but a key ending in
// digits (`line2`, `addressLine2`) reads as a field name with a number
// in it and is reported as ambiguous.
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;

use crate::core::constants::MAX_ARRAY_INDEX;
use crate::core::error::KeyError;

static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]+|[a-z]+|[0-9]+").expect("segment pattern is valid"));

// =============================================================================
// JOIN
// =============================================================================

/// Join a child key onto an already-joined prefix.
///
/// # Example
/// ```
/// use spark_query_sync::join_key;
///
/// assert_eq!(join_key("", "user"), "user");
/// assert_eq!(join_key("user", "address"), "userAddress");
/// assert_eq!(join_key("items", "0"), "items0");
/// ```
pub fn join_key(prefix: &str, child: &str) -> String {
    if prefix.is_empty() {
        return child.to_string();
    }
    let mut chars = child.chars();
    match chars.next() {
        Some(first) => {
            let mut joined = String::with_capacity(prefix.len() + child.len());
            joined.push_str(prefix);
            joined.extend(first.to_uppercase());
            joined.push_str(chars.as_str());
            joined
        }
        None => prefix.to_string(),
    }
}

// =============================================================================
// SPLIT
// =============================================================================

/// Split a joined key into its path, restoring each field name.
///
/// Fails when the key is empty or cannot be split unambiguously.
///
/// # Example
/// ```
/// use spark_query_sync::split_key;
///
/// assert_eq!(split_key("userAddressCity").unwrap(), vec!["user", "address", "city"]);
/// assert_eq!(split_key("tags0Name").unwrap(), vec!["tags", "0", "name"]);
/// assert!(split_key("line2").is_err());
/// assert!(split_key("userID").is_err());
/// ```
pub fn split_key(key: &str) -> Result<Vec<String>, KeyError> {
    let raw = raw_segments(key)?;
    Ok(raw
        .iter()
        .enumerate()
        .map(|(idx, segment)| field_name(segment, idx))
        .collect())
}

/// Regex matches of `key`, checked for a lossless split.
pub(crate) fn raw_segments(key: &str) -> Result<Vec<&str>, KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    let segments: Vec<&str> = SEGMENT.find_iter(key).map(|m| m.as_str()).collect();

    // Every character must be covered, or characters were silently dropped
    let covered: usize = segments.iter().map(|s| s.len()).sum();
    let leading_capital = key.starts_with(|c: char| c.is_ascii_uppercase());
    // A lowercase run after the first segment means no case boundary was there
    let unbounded = segments
        .iter()
        .skip(1)
        .any(|s| s.starts_with(|c: char| c.is_ascii_lowercase()));

    // `line2` is a field name far more often than `line[2]`
    let trailing_digits = segments.len() > 1 && segments.last().is_some_and(|s| is_index(s));

    if covered != key.len() || leading_capital || unbounded || trailing_digits {
        return Err(KeyError::Ambiguous {
            key: key.to_string(),
            segments: segments.iter().map(|s| s.to_string()).collect(),
        });
    }

    if let Some(index) = segments
        .iter()
        .filter_map(|s| s.parse::<usize>().ok())
        .find(|index| *index > MAX_ARRAY_INDEX)
    {
        return Err(KeyError::IndexTooLarge {
            key: key.to_string(),
            index,
            limit: MAX_ARRAY_INDEX,
        });
    }

    // Digit runs too long for usize are still numeric segments
    if segments
        .iter()
        .any(|s| s.starts_with(|c: char| c.is_ascii_digit()) && s.parse::<usize>().is_err())
    {
        return Err(KeyError::IndexTooLarge {
            key: key.to_string(),
            index: usize::MAX,
            limit: MAX_ARRAY_INDEX,
        });
    }

    Ok(segments)
}

/// Restore the field name of a raw segment.
fn field_name(segment: &str, idx: usize) -> String {
    if idx == 0 {
        return segment.to_string();
    }
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a segment addresses an array slot.
pub(crate) fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// TESTS
// =============================================================================
