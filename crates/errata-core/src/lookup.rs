// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;

/// Walks a dotted field path through nested objects and arrays. Array
/// segments must be plain non-negative integers. Every failure mode —
/// absent path, missing key, bad or out-of-range index, scalar mid-path —
/// is "not found", never an error.
#[must_use]
pub fn resolve<'a>(path: Option<&str>, root: &'a Value) -> Option<&'a Value> {
    let path = path?;
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                if !segment.chars().all(|c| c.is_ascii_digit()) || segment.is_empty() {
                    return None;
                }
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_objects_and_arrays() {
        let root = json!({
            "info": {"header": {"dicom": {"SeriesDescription": "t1"}}},
            "classification": {"Intent": ["Structural", "Functional"]}
        });
        assert_eq!(
            resolve(Some("info.header.dicom.SeriesDescription"), &root),
            Some(&json!("t1"))
        );
        assert_eq!(
            resolve(Some("classification.Intent.1"), &root),
            Some(&json!("Functional"))
        );
    }

    #[test]
    fn found_null_is_distinct_from_not_found() {
        let root = json!({"modality": null});
        assert_eq!(resolve(Some("modality"), &root), Some(&Value::Null));
        assert_eq!(resolve(Some("missing"), &root), None);
    }

    #[test]
    fn failure_modes_reduce_to_not_found() {
        let root = json!({"items": [1, 2], "scalar": 5});
        assert_eq!(resolve(None, &root), None);
        assert_eq!(resolve(Some("items.2"), &root), None);
        assert_eq!(resolve(Some("items.-1"), &root), None);
        assert_eq!(resolve(Some("items.one"), &root), None);
        assert_eq!(resolve(Some("scalar.deeper"), &root), None);
        assert_eq!(resolve(Some(""), &root), None);
    }

    #[test]
    fn zero_padded_indices_are_accepted() {
        let root = json!({"items": ["a", "b", "c"]});
        assert_eq!(resolve(Some("items.02"), &root), Some(&json!("c")));
    }
}
