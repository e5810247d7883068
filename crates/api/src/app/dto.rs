//! Typed coercions out of a validated parameter mapping.
//!
//! `include_only` proves a key is present; these helpers prove its shape.
//! Query-string values always arrive as strings, so the numeric coercions
//! accept both JSON numbers and numeric strings.

use serde_json::Value;
use uuid::Uuid;

use stockops_core::{ApiError, ApiResult, ParamMap};

pub fn require_string(params: &ParamMap, key: &str) -> ApiResult<String> {
    match params.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(ApiError::invalid(key, "must not be empty")),
        Some(other) => Err(ApiError::invalid(
            key,
            format!("expected a string, got {other}"),
        )),
        None => Err(ApiError::missing(key)),
    }
}

pub fn require_i64(params: &ParamMap, key: &str) -> ApiResult<i64> {
    match params.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ApiError::invalid(key, "expected an integer")),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ApiError::invalid(key, "expected an integer")),
        Some(other) => Err(ApiError::invalid(
            key,
            format!("expected an integer, got {other}"),
        )),
        None => Err(ApiError::missing(key)),
    }
}

pub fn require_uuid(params: &ParamMap, key: &str) -> ApiResult<Uuid> {
    let raw = require_string(params, key)?;
    raw.parse()
        .map_err(|_| ApiError::invalid(key, format!("`{raw}` is not a valid job id")))
}

/// Export rows: an array of row arrays, cells taken as-is.
pub fn require_rows(params: &ParamMap, key: &str) -> ApiResult<Vec<Vec<Value>>> {
    match params.get(key) {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| match row {
                Value::Array(cells) => Ok(cells.clone()),
                other => Err(ApiError::invalid(
                    key,
                    format!("expected an array of rows, got {other}"),
                )),
            })
            .collect(),
        Some(other) => Err(ApiError::invalid(
            key,
            format!("expected an array, got {other}"),
        )),
        None => Err(ApiError::missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn strings_must_be_non_empty() {
        let p = params(&[("name", json!("june")), ("blank", json!(""))]);
        assert_eq!(require_string(&p, "name").unwrap(), "june");
        assert!(require_string(&p, "blank").is_err());
        assert!(matches!(
            require_string(&p, "gone").unwrap_err(),
            ApiError::MissingParameter { .. }
        ));
    }

    #[test]
    fn integers_accept_numbers_and_numeric_strings() {
        let p = params(&[("n", json!(7)), ("s", json!("7")), ("f", json!(1.5))]);
        assert_eq!(require_i64(&p, "n").unwrap(), 7);
        assert_eq!(require_i64(&p, "s").unwrap(), 7);
        assert!(require_i64(&p, "f").is_err());
    }

    #[test]
    fn uuids_report_the_offending_value() {
        let p = params(&[("id", json!("not-a-uuid"))]);
        let err = require_uuid(&p, "id").unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn rows_must_be_arrays_of_arrays() {
        let p = params(&[
            ("ok", json!([["a", 1], ["b", 2]])),
            ("flat", json!(["a", "b"])),
        ]);
        assert_eq!(require_rows(&p, "ok").unwrap().len(), 2);
        assert!(require_rows(&p, "flat").is_err());
    }
}
