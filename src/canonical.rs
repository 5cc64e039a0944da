//! # Canonical JSON
//!
//! Deterministic serialization of JSON values used to build the byte string
//! a credential signature covers. Object keys are written in byte order at
//! every level of nesting, array order is preserved and no insignificant
//! whitespace is emitted. Two values with the same content therefore always
//! produce the same string, whatever order their keys were inserted in.

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Context, Err};
use crate::Result;

/// Produce the canonical string form of a JSON value.
#[must_use]
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Serialize `data` to JSON and return its canonical string form.
///
/// # Errors
///
/// Returns an `invalid_input` error if `data` cannot be represented as JSON,
/// for example a map with non-string keys.
pub fn to_canonical_string(data: &impl Serialize) -> Result<String> {
    let value = serde_json::to_value(data).context(Err::InvalidInput)?;
    Ok(canonicalize(&value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // sort explicitly: `serde_json::Map` keeps insertion order when
            // `preserve_order` is enabled anywhere in the build
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(out, &Value::String(key.clone()));
                out.push(':');
                write_value(out, val);
            }
            out.push('}');
        }
        scalar => write_scalar(out, scalar),
    }
}

fn write_scalar(out: &mut String, value: &Value) {
    // scalars serialize compactly via `Display`
    let _ = write!(out, "{value}");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::{json, Map};

    use super::*;

    #[test]
    fn sorts_nested_keys() {
        let value = json!({
            "z": 1,
            "a": {"y": [3, {"d": true, "c": null}], "b": "x"},
            "m": []
        });
        assert_eq!(
            canonicalize(&value),
            r#"{"a":{"b":"x","y":[3,{"c":null,"d":true}]},"m":[],"z":1}"#
        );
    }

    #[test]
    fn order_invariant() {
        let mut first = Map::new();
        first.insert("name".into(), json!("John"));
        first.insert("age".into(), json!(30));
        first.insert("address".into(), json!({"city": "Auckland", "country": "NZ"}));

        let mut second = Map::new();
        second.insert("address".into(), json!({"country": "NZ", "city": "Auckland"}));
        second.insert("age".into(), json!(30));
        second.insert("name".into(), json!("John"));

        assert_eq!(canonicalize(&Value::Object(first)), canonicalize(&Value::Object(second)));
    }

    #[test]
    fn idempotent() {
        let value = json!({"b": [1.5, "two", {"y": 1, "x": 2}], "a": "quote \" and \\"});
        let once = canonicalize(&value);
        let reparsed: Value = serde_json::from_str(&once).expect("should parse");
        assert_eq!(canonicalize(&reparsed), once);
    }

    #[test]
    fn primitives_pass_through() {
        assert_eq!(canonicalize(&Value::Null), "null");
        assert_eq!(canonicalize(&json!(false)), "false");
        assert_eq!(canonicalize(&json!(-42)), "-42");
        assert_eq!(canonicalize(&json!("héllo\n")), r#""héllo\n""#);
        assert_eq!(canonicalize(&json!([3, 1, 2])), "[3,1,2]");
    }

    #[test]
    fn keys_sort_by_bytes() {
        let value = json!({"b": 1, "B": 2, "a": 3, "_": 4});
        assert_eq!(canonicalize(&value), r#"{"B":2,"_":4,"a":3,"b":1}"#);
    }

    #[test]
    fn serializable_input() {
        let mut map = HashMap::new();
        map.insert("second", 2);
        map.insert("first", 1);
        let canonical = to_canonical_string(&map).expect("should canonicalize");
        assert_eq!(canonical, r#"{"first":1,"second":2}"#);
    }

    #[test]
    fn non_string_keys_fail_fast() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");
        let err = to_canonical_string(&map).expect_err("should fail");
        assert!(err.is(Err::InvalidInput));
    }
}
