// Canonical JSON encoding for sourcetrace
//
// Proof packs must be byte-for-byte reproducible, so every JSON document
// they contain is serialized through this single utility: object keys
// sorted lexicographically, 2-space indentation, no trailing newline.
// The builder, the verifier, and test fixtures all share this encoding.

use anyhow::Result;
use serde::Serialize;

/// Serializes a value to canonical JSON bytes.
///
/// The value is first converted to a `serde_json::Value`, whose object
/// representation keeps keys in sorted order, then pretty-printed with
/// the default 2-space indent. Identical logical content always yields
/// identical bytes.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_keys_are_sorted() {
        let json = r#"{"zebra": 1, "alpha": 2, "middle": 3}"#;
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        let bytes = to_canonical_json(&value).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n  \"alpha\": 2,\n  \"middle\": 3,\n  \"zebra\": 1\n}");
    }

    #[test]
    fn test_field_order_independence() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"b": {"y": 1, "x": 2}, "a": 3}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"a": 3, "b": {"x": 2, "y": 1}}"#).unwrap();
        assert_eq!(
            to_canonical_json(&a).unwrap(),
            to_canonical_json(&b).unwrap()
        );
    }

    #[test]
    fn test_struct_fields_sorted_regardless_of_declaration_order() {
        #[derive(Serialize, Deserialize)]
        struct Doc {
            zulu: u32,
            alpha: String,
        }

        let doc = Doc {
            zulu: 7,
            alpha: "first".to_string(),
        };
        let text = String::from_utf8(to_canonical_json(&doc).unwrap()).unwrap();
        assert_eq!(text, "{\n  \"alpha\": \"first\",\n  \"zulu\": 7\n}");
    }

    #[test]
    fn test_repeated_encoding_is_byte_identical() {
        let value = serde_json::json!({
            "items": [{"id": "a", "n": 1}, {"id": "b", "n": 2}],
            "source_id": "s-1"
        });
        assert_eq!(
            to_canonical_json(&value).unwrap(),
            to_canonical_json(&value).unwrap()
        );
    }
}
