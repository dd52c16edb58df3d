//! Scalar coercion for default resolution.
//!
//! Coercions are deliberately narrow. A decimal string may become an int or a
//! float, `"true"`/`"false"` may become a bool, and that is all. Anything else
//! that does not already have the declared shape is rejected.

use schemata_config::ResolutionContext;
use serde_json::{Number, Value};

use crate::error::ValidationErrorKind;
use crate::types::ScalarType;

/// Convert `raw` into the declared scalar type.
pub fn coerce_scalar(
    expected: ScalarType,
    raw: Value,
    context: &ResolutionContext,
) -> Result<Value, ValidationErrorKind> {
    let mismatch = |raw: &Value| ValidationErrorKind::Coercion {
        expected,
        found: describe_value(raw),
    };

    match (expected, raw) {
        (ScalarType::Any, raw) => Ok(raw),

        (ScalarType::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
        (ScalarType::Int, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| mismatch(&Value::String(s))),

        (ScalarType::Float, Value::Number(n)) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| mismatch(&Value::Number(n))),
        (ScalarType::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| mismatch(&Value::String(s))),

        (ScalarType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ScalarType::Bool, Value::String(s)) => {
            let parsed = match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            };
            parsed
                .map(Value::Bool)
                .ok_or_else(|| mismatch(&Value::String(s)))
        }

        (ScalarType::Str, Value::String(s)) => Ok(Value::String(s)),

        (ScalarType::Path, Value::String(s)) => Ok(Value::String(
            context.resolve_path(&s).to_string_lossy().into_owned(),
        )),

        (_, raw) => Err(mismatch(&raw)),
    }
}

/// Short description of a value for error messages.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(40).collect();
            format!("string \"{head}...\"")
        }
        Value::String(s) => format!("string \"{s}\""),
        Value::Array(items) => format!("sequence of {} items", items.len()),
        Value::Object(_) => "mapping".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ScalarType::Int, json!(5), json!(5))]
    #[case(ScalarType::Int, json!("5"), json!(5))]
    #[case(ScalarType::Int, json!(" -12 "), json!(-12))]
    #[case(ScalarType::Float, json!(2), json!(2.0))]
    #[case(ScalarType::Float, json!("2.5"), json!(2.5))]
    #[case(ScalarType::Bool, json!(true), json!(true))]
    #[case(ScalarType::Bool, json!("false"), json!(false))]
    #[case(ScalarType::Str, json!("hello"), json!("hello"))]
    #[case(ScalarType::Any, json!({"a": [1, 2]}), json!({"a": [1, 2]}))]
    #[case(ScalarType::Any, json!(null), json!(null))]
    fn test_accepted(#[case] expected: ScalarType, #[case] raw: Value, #[case] out: Value) {
        let ctx = ResolutionContext::for_test();
        assert_eq!(coerce_scalar(expected, raw, &ctx).unwrap(), out);
    }

    #[rstest]
    #[case(ScalarType::Int, json!("five"))]
    #[case(ScalarType::Int, json!(5.5))]
    #[case(ScalarType::Int, json!(true))]
    #[case(ScalarType::Float, json!("NaN"))]
    #[case(ScalarType::Bool, json!("yes"))]
    #[case(ScalarType::Bool, json!(1))]
    #[case(ScalarType::Str, json!(5))]
    #[case(ScalarType::Str, json!(null))]
    #[case(ScalarType::Path, json!(["a"]))]
    fn test_rejected(#[case] expected: ScalarType, #[case] raw: Value) {
        let ctx = ResolutionContext::for_test();
        let err = coerce_scalar(expected, raw, &ctx).unwrap_err();
        assert!(matches!(err, ValidationErrorKind::Coercion { expected: e, .. } if e == expected));
    }

    #[test]
    fn test_path_anchored_at_base() {
        let ctx = ResolutionContext::new("/project/defs", serde_json::Map::new());
        let out = coerce_scalar(ScalarType::Path, json!("scripts/run.sh"), &ctx).unwrap();
        assert_eq!(out, json!("/project/defs/scripts/run.sh"));

        let absolute = coerce_scalar(ScalarType::Path, json!("/bin/sh"), &ctx).unwrap();
        assert_eq!(absolute, json!("/bin/sh"));
    }

    #[test]
    fn test_describe_value() {
        assert_eq!(describe_value(&json!("five")), "string \"five\"");
        assert_eq!(describe_value(&json!([1, 2])), "sequence of 2 items");
        assert_eq!(describe_value(&json!({})), "mapping");
        assert_eq!(describe_value(&Value::Null), "null");
    }
}
