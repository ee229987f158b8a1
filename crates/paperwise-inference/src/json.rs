//! Lenient parsing of model JSON output.

use serde::de::DeserializeOwned;

/// Strip a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse `raw` as `T`, tolerating the shapes models commonly produce instead
/// of a bare array: a code fence, an object wrapping the array
/// (`{"papers": [...]}`), or a single object where a one-element array was
/// asked for.
pub fn parse_json_lenient<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let raw = strip_code_fence(raw);
    let direct_err = match serde_json::from_str::<T>(raw) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };
    if let Ok(obj) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
        for value in obj.values() {
            if value.is_array() {
                if let Ok(v) = serde_json::from_value::<T>(value.clone()) {
                    return Ok(v);
                }
            }
        }
        let wrapped = serde_json::Value::Array(vec![serde_json::Value::Object(obj)]);
        if let Ok(v) = serde_json::from_value::<T>(wrapped) {
            return Ok(v);
        }
    }
    Err(direct_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  [1] "), "[1]");
    }

    #[test]
    fn test_parse_wrapped_array() {
        let v: Vec<u32> = parse_json_lenient(r#"{"papers": [1, 2]}"#).unwrap();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn test_parse_single_object_as_array() {
        #[derive(serde::Deserialize)]
        struct Item {
            id: String,
        }
        let v: Vec<Item> = parse_json_lenient(r#"{"id": "PMID1"}"#).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].id, "PMID1");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_json_lenient::<Vec<u32>>("not json").is_err());
    }
}
