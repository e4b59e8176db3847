// ============================================================================
// spark-query-sync - Equality Functions
// Change detection for reactive writes and flattened snapshots
// ============================================================================

use serde_json::Value;

// =============================================================================
// STRICT EQUALITY (Default)
// =============================================================================

/// Default strict equality using PartialEq.
/// This is the default for `reactive()`.
///
/// # Example
/// ```
/// use spark_query_sync::reactivity::equality::equals;
///
/// assert!(equals(&42, &42));
/// assert!(!equals(&42, &43));
/// ```
pub fn equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// Never equal - every write counts as a change.
///
/// Used by `mutable_reactive()` for values without a meaningful PartialEq.
pub fn never_equals<T>(_a: &T, _b: &T) -> bool {
    false
}

// =============================================================================
// JSON EQUALITY
// =============================================================================

/// Deep equality for JSON values where numbers compare by magnitude.
///
/// `serde_json` keeps integers and floats apart, so `31` and `31.0` are
/// different `Value`s. A query string cannot tell them apart, so the
/// snapshot diff must not either.
///
/// # Example
/// ```
/// use serde_json::json;
/// use spark_query_sync::reactivity::equality::json_equals;
///
/// assert!(json_equals(&json!(31), &json!(31.0)));
/// assert!(json_equals(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
/// assert!(!json_equals(&json!("1"), &json!(1)));
/// ```
pub fn json_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x == y {
                return true;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equals(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equals(x, y)))
        }
        _ => a == b,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn never_equals_always_false() {
        assert!(!never_equals(&1, &1));
        assert!(!never_equals(&"x", &"x"));
    }

    #[test]
    fn json_equals_scalars() {
        assert!(json_equals(&json!(null), &json!(null)));
        assert!(json_equals(&json!(true), &json!(true)));
        assert!(!json_equals(&json!(true), &json!(false)));
        assert!(json_equals(&json!("a"), &json!("a")));
        assert!(!json_equals(&json!(1), &json!(2)));
        assert!(!json_equals(&json!(1.5), &json!(1)));
    }

    #[test]
    fn json_equals_large_integers_stay_exact() {
        assert!(json_equals(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!json_equals(&json!(-1), &json!(1)));
    }

    #[test]
    fn json_equals_nested() {
        let a = json!({ "tags": ["x", "y"], "meta": { "n": 2 } });
        let b = json!({ "meta": { "n": 2.0 }, "tags": ["x", "y"] });
        assert!(json_equals(&a, &b));

        let c = json!({ "tags": ["y", "x"], "meta": { "n": 2 } });
        assert!(!json_equals(&a, &c));

        let d = json!({ "tags": ["x", "y"] });
        assert!(!json_equals(&a, &d));
    }
}
