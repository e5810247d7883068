//! Parameter validation over a request's source mapping.
//!
//! The source mapping is the parsed query string for retrieval methods and
//! the parsed body otherwise; both arrive here as a JSON object. Validation
//! is first-failure: the first missing (or forbidden) key aborts the call.

use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Key/value mapping a request's parameters are read from.
pub type ParamMap = Map<String, Value>;

/// Outcome of [`include_only`]: the requested keys and everything else.
///
/// `valid` and `others` are disjoint and together cover every key of the
/// source mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamsResult {
    pub valid: ParamMap,
    pub others: ParamMap,
}

/// Copy `keys` out of `source`, failing on the first absent one.
///
/// An explicit JSON `null` counts as present; only a key with no entry at
/// all is missing. Every source key not in `keys` lands in `others`.
/// `source` is never mutated.
pub fn include_only(source: &ParamMap, keys: &[&str]) -> ApiResult<ParamsResult> {
    let mut valid = ParamMap::new();
    for &key in keys {
        match source.get(key) {
            Some(value) => {
                valid.insert(key.to_owned(), value.clone());
            }
            None => return Err(ApiError::missing(key)),
        }
    }

    let mut others = ParamMap::new();
    for (key, value) in source {
        if !keys.contains(&key.as_str()) {
            others.insert(key.clone(), value.clone());
        }
    }

    Ok(ParamsResult { valid, others })
}

/// Fail on the first key of `keys` that is present in `source` with a
/// non-null value.
pub fn exclude_only(source: &ParamMap, keys: &[&str]) -> ApiResult<()> {
    for &key in keys {
        if let Some(value) = source.get(key) {
            if !value.is_null() {
                return Err(ApiError::disallowed(key, display_value(value)));
            }
        }
    }
    Ok(())
}

/// Rendering for error messages; bare strings stay unquoted.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(pairs: &[(&str, Value)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn include_only_partitions_the_source() {
        let src = source(&[
            ("id", json!("5")),
            ("page", json!(2)),
            ("sort", json!("asc")),
        ]);

        let result = include_only(&src, &["id"]).unwrap();

        assert_eq!(result.valid, source(&[("id", json!("5"))]));
        assert_eq!(
            result.others,
            source(&[("page", json!(2)), ("sort", json!("asc"))])
        );
    }

    #[test]
    fn include_only_fails_on_the_first_missing_key() {
        let src = source(&[("a", json!(1))]);

        let err = include_only(&src, &["a", "b", "c"]).unwrap_err();

        match err {
            ApiError::MissingParameter { key } => assert_eq!(key, "b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explicit_null_counts_as_present() {
        let src = source(&[("note", Value::Null)]);

        let result = include_only(&src, &["note"]).unwrap();

        assert_eq!(result.valid.get("note"), Some(&Value::Null));
        assert!(result.others.is_empty());
    }

    #[test]
    fn exclude_only_ignores_absent_and_null_keys() {
        let src = source(&[("keep", json!("x")), ("gone", Value::Null)]);

        exclude_only(&src, &["missing", "gone"]).unwrap();
    }

    #[test]
    fn exclude_only_names_key_and_value() {
        let src = source(&[("id", json!("5"))]);

        let err = exclude_only(&src, &["id"]).unwrap_err();

        match err {
            ApiError::DisallowedParameter { key, value } => {
                assert_eq!(key, "id");
                assert_eq!(value, "5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exclude_only_renders_non_string_values() {
        let src = source(&[("force", json!(true))]);

        let err = exclude_only(&src, &["force"]).unwrap_err();
        assert_eq!(err.to_string(), "disallowed parameter force=true");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn include_only_is_a_partition(
                entries in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..8usize),
                take in 0usize..8,
            ) {
                let src: ParamMap = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                let required: Vec<&str> =
                    entries.keys().take(take).map(String::as_str).collect();

                let result = include_only(&src, &required).unwrap();

                prop_assert_eq!(result.valid.len() + result.others.len(), src.len());
                for (key, value) in &src {
                    let (hit, miss) = if required.contains(&key.as_str()) {
                        (&result.valid, &result.others)
                    } else {
                        (&result.others, &result.valid)
                    };
                    prop_assert_eq!(hit.get(key), Some(value));
                    prop_assert!(miss.get(key).is_none());
                }
            }

            #[test]
            fn include_only_fails_iff_a_required_key_is_absent(
                entries in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..8usize),
                absent in "[A-Z]{1,4}",
            ) {
                let src: ParamMap = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();

                let present: Vec<&str> = entries.keys().map(String::as_str).collect();
                prop_assert!(include_only(&src, &present).is_ok());

                let mut with_absent = present.clone();
                with_absent.push(absent.as_str());
                let err = include_only(&src, &with_absent).unwrap_err();
                let is_missing = matches!(
                    err,
                    ApiError::MissingParameter { key } if key == absent
                );
                prop_assert!(is_missing);
            }
        }
    }
}
