//! Conversions for the free-form metadata attached to a log.
//!
//! Metadata is stored as JSON text in the `metadata` column. HTTP clients see the decoded JSON
//! object as is; gRPC clients only have a `map<string, string>`, so every value is turned into a
//! string on the way out.

use std::collections::HashMap;

use logbook_common::models::log::Metadata;
use serde_json::Value;

/// Metadata read back from the `metadata` column
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoded {
    pub metadata: Metadata,
    /// The column held something other than a JSON object, and it was dropped
    pub unparseable: bool,
}

/// Value for the `metadata` column. Absent and empty metadata are both stored as NULL.
pub fn encode(metadata: Option<Metadata>) -> Option<String> {
    metadata
        .filter(|metadata| !metadata.is_empty())
        .map(|metadata| Value::Object(metadata).to_string())
}

/// Reads the `metadata` column back.
///
/// Never fails: a corrupt column yields empty metadata with [Decoded::unparseable] set so the rest
/// of the log can still be served.
pub fn decode(column: Option<&str>) -> Decoded {
    let Some(column) = column.filter(|column| !column.trim().is_empty()) else {
        return Decoded::default();
    };

    match serde_json::from_str(column) {
        Ok(Value::Object(metadata)) => Decoded {
            metadata,
            unparseable: false,
        },
        Ok(Value::Null) => Decoded::default(),
        _ => Decoded {
            metadata: Metadata::new(),
            unparseable: true,
        },
    }
}

/// Metadata as a gRPC string map. Strings are kept verbatim, other values become their JSON text.
pub fn to_wire(metadata: &Metadata) -> HashMap<String, String> {
    metadata
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(value) => value.clone(),
                other => other.to_string(),
            };

            (key.clone(), value)
        })
        .collect()
}

/// Metadata from a gRPC string map. An empty map means no metadata.
pub fn from_wire(metadata: HashMap<String, String>) -> Option<Metadata> {
    if metadata.is_empty() {
        return None;
    }

    Some(
        metadata
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("test metadata should be an object"),
        }
    }

    #[test]
    fn empty_metadata_is_not_stored() {
        assert_eq!(encode(None), None);
        assert_eq!(encode(Some(Metadata::new())), None);
    }

    #[test]
    fn encode_then_decode() {
        let original = metadata(json!({"user": "42", "attempts": 3, "locked": true}));
        let column = encode(Some(original.clone())).unwrap();

        assert_eq!(
            decode(Some(&column)),
            Decoded {
                metadata: original,
                unparseable: false,
            }
        );
    }

    #[test]
    fn missing_column_decodes_to_empty() {
        assert_eq!(decode(None), Decoded::default());
        assert_eq!(decode(Some("")), Decoded::default());
        assert_eq!(decode(Some("null")), Decoded::default());
    }

    #[test]
    fn corrupt_column_is_flagged() {
        for column in ["{not json", "[1, 2]", "\"text\"", "42"] {
            let decoded = decode(Some(column));

            assert!(decoded.metadata.is_empty(), "{column} should decode to empty");
            assert!(decoded.unparseable, "{column} should be flagged");
        }
    }

    #[test]
    fn wire_values_are_strings() {
        let wire = to_wire(&metadata(json!({
            "user": "42",
            "attempts": 3,
            "ratio": 0.5,
            "locked": false,
            "missing": null,
            "tags": ["a", "b"],
        })));

        assert_eq!(
            wire,
            HashMap::from([
                ("user".to_string(), "42".to_string()),
                ("attempts".to_string(), "3".to_string()),
                ("ratio".to_string(), "0.5".to_string()),
                ("locked".to_string(), "false".to_string()),
                ("missing".to_string(), "null".to_string()),
                ("tags".to_string(), r#"["a","b"]"#.to_string()),
            ])
        );
    }

    #[test]
    fn from_wire_keeps_strings() {
        assert_eq!(from_wire(HashMap::new()), None);

        let lifted = from_wire(HashMap::from([("k".to_string(), "v".to_string())])).unwrap();
        assert_eq!(lifted, metadata(json!({"k": "v"})));
        assert_eq!(to_wire(&lifted), HashMap::from([("k".to_string(), "v".to_string())]));
    }
}
