//! Canonical JSON encoding for hashed `details` payloads.
//!
//! Object keys are emitted in byte-wise lexicographic order at every depth
//! and no whitespace is produced.  The output depends only on the logical
//! value, never on the order keys were inserted in, so it stays stable even
//! if some other crate in the build enables `serde_json/preserve_order`.

use serde_json::Value;

/// Encode `value` as canonical JSON.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        // Null, Bool and Number already have a single compact JSON form.
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push_str(&Value::from(s).to_string());
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::canonical_json;

    #[test]
    fn keys_are_sorted_at_every_depth() {
        let value = json!({
            "zeta": 1,
            "alpha": { "y": true, "b": null },
            "mid": [ { "k2": "v", "k1": "w" } ]
        });
        assert_eq!(
            canonical_json(&value),
            r#"{"alpha":{"b":null,"y":true},"mid":[{"k1":"w","k2":"v"}],"zeta":1}"#
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut forward = Map::new();
        forward.insert("amount".to_string(), json!(10));
        forward.insert("reason".to_string(), json!("daily check-in"));

        let mut reverse = Map::new();
        reverse.insert("reason".to_string(), json!("daily check-in"));
        reverse.insert("amount".to_string(), json!(10));

        assert_eq!(
            canonical_json(&Value::Object(forward)),
            canonical_json(&Value::Object(reverse))
        );
    }

    #[test]
    fn strings_are_escaped() {
        let value = json!({ "note": "line\n\"quoted\"|pipe" });
        assert_eq!(
            canonical_json(&value),
            r#"{"note":"line\n\"quoted\"|pipe"}"#
        );
    }

    #[test]
    fn scalars_encode_compactly() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!("plain text")), "\"plain text\"");
        assert_eq!(canonical_json(&json!(42)), "42");
        assert_eq!(canonical_json(&json!(-1.5)), "-1.5");
        assert_eq!(canonical_json(&json!([1, "two", false])), r#"[1,"two",false]"#);
    }

    #[test]
    fn string_and_object_payloads_differ() {
        // A details string that happens to look like JSON must not collide
        // with the equivalent object.
        let as_string = json!(r#"{"email":"a@b.c"}"#);
        let as_object = json!({ "email": "a@b.c" });
        assert_ne!(canonical_json(&as_string), canonical_json(&as_object));
    }
}
