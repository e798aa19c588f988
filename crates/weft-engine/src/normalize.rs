//! Value normalization and multi-edge merging
//!
//! Everything flowing across an edge is coerced into the target port's
//! declared type before a handler sees it. Unrecognized or empty input
//! normalizes to `Null` - resolution never fails a run by itself.

use serde_json::Value;

use crate::types::PortDataType;

/// Coerce a value into the target port type
///
/// Text stringifies; media types accept a raw URL/data-URI string, a
/// `{url}` object, a `{data, mimeType}` object, or an array of any of
/// those (first element wins). Idempotent for all types.
pub fn normalize(value: Value, target: PortDataType) -> Value {
    match target {
        PortDataType::Any => value,
        PortDataType::Text => normalize_text(value),
        PortDataType::Image | PortDataType::Video | PortDataType::Model3d => {
            normalize_media(value)
        }
    }
}

fn normalize_text(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(s),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => match serde_json::to_string(&other) {
            Ok(json) => Value::String(json),
            Err(_) => Value::Null,
        },
    }
}

fn normalize_media(value: Value) -> Value {
    match media_ref(&value) {
        Some(url) => Value::String(url),
        None => {
            // A merged multi-edge value stays a list of refs
            if let Value::Array(items) = &value {
                let refs: Vec<Value> = items
                    .iter()
                    .filter_map(media_ref)
                    .map(Value::String)
                    .collect();
                if !refs.is_empty() {
                    return Value::Array(refs);
                }
            }
            Value::Null
        }
    }
}

/// Extract a single URL or data URI from the accepted media shapes
pub fn media_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(obj) => {
            if let Some(url) = obj.get("url").and_then(|u| u.as_str()) {
                if !url.trim().is_empty() {
                    return Some(url.to_string());
                }
            }
            let data = obj.get("data").and_then(|d| d.as_str())?;
            let mime = obj
                .get("mimeType")
                .or_else(|| obj.get("mime_type"))
                .and_then(|m| m.as_str())
                .unwrap_or("image/png");
            Some(format!("data:{};base64,{}", mime, data))
        }
        // First element wins for a single-ref context
        Value::Array(items) if items.len() == 1 => media_ref(items.first()?),
        _ => None,
    }
}

/// Collect every media ref out of a scalar-or-list value, in order
pub fn media_refs(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(media_ref).collect(),
        other => media_ref(other).into_iter().collect(),
    }
}

/// Merge a second edge's value into an occupied port
///
/// Text ports represent prose, so text concatenates with a newline.
/// Everything else forms an ordered list: scalar + scalar becomes a
/// 2-element list, list + scalar appends.
pub fn merge(existing: Value, incoming: Value, target: PortDataType) -> Value {
    if incoming.is_null() {
        return existing;
    }
    if existing.is_null() {
        return incoming;
    }

    if target == PortDataType::Text {
        let left = normalize_text(existing);
        let right = normalize_text(incoming);
        return match (left, right) {
            (Value::String(a), Value::String(b)) => Value::String(format!("{}\n{}", a, b)),
            (a, Value::Null) => a,
            (_, b) => b,
        };
    }

    match existing {
        Value::Array(mut items) => {
            items.push(incoming);
            Value::Array(items)
        }
        scalar => Value::Array(vec![scalar, incoming]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_stringifies() {
        assert_eq!(normalize(json!("hello"), PortDataType::Text), json!("hello"));
        assert_eq!(normalize(json!(42), PortDataType::Text), json!("42"));
        assert_eq!(normalize(json!(true), PortDataType::Text), json!("true"));
        assert_eq!(
            normalize(json!({"a": 1}), PortDataType::Text),
            json!("{\"a\":1}")
        );
        assert_eq!(normalize(Value::Null, PortDataType::Text), Value::Null);
    }

    #[test]
    fn test_text_is_idempotent() {
        for value in [json!("hi"), json!(1.5), json!({"k": "v"}), json!([1, 2])] {
            let once = normalize(value, PortDataType::Text);
            let twice = normalize(once.clone(), PortDataType::Text);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_media_accepts_url_and_data_uri() {
        assert_eq!(
            normalize(json!("https://x/a.png"), PortDataType::Image),
            json!("https://x/a.png")
        );
        assert_eq!(
            normalize(json!("data:image/png;base64,abc"), PortDataType::Video),
            json!("data:image/png;base64,abc")
        );
    }

    #[test]
    fn test_media_accepts_url_object() {
        assert_eq!(
            normalize(json!({"url": "https://x/a.png"}), PortDataType::Image),
            json!("https://x/a.png")
        );
    }

    #[test]
    fn test_media_builds_data_uri_from_payload_object() {
        assert_eq!(
            normalize(
                json!({"data": "abc", "mimeType": "image/jpeg"}),
                PortDataType::Image
            ),
            json!("data:image/jpeg;base64,abc")
        );
        // snake_case alias and default mime
        assert_eq!(
            normalize(json!({"data": "abc", "mime_type": "image/webp"}), PortDataType::Image),
            json!("data:image/webp;base64,abc")
        );
        assert_eq!(
            normalize(json!({"data": "abc"}), PortDataType::Image),
            json!("data:image/png;base64,abc")
        );
    }

    #[test]
    fn test_media_single_element_array_unwraps() {
        assert_eq!(
            normalize(json!(["https://x/a.png"]), PortDataType::Image),
            json!("https://x/a.png")
        );
    }

    #[test]
    fn test_media_list_stays_a_list() {
        assert_eq!(
            normalize(
                json!(["https://x/a.png", {"url": "https://x/b.png"}]),
                PortDataType::Image
            ),
            json!(["https://x/a.png", "https://x/b.png"])
        );
    }

    #[test]
    fn test_model3d_accepts_bare_archive_url() {
        assert_eq!(
            normalize(json!("https://cdn.x/scene.zip"), PortDataType::Model3d),
            json!("https://cdn.x/scene.zip")
        );
    }

    #[test]
    fn test_unrecognized_normalizes_to_null() {
        assert_eq!(normalize(json!(17), PortDataType::Image), Value::Null);
        assert_eq!(normalize(json!({"nope": 1}), PortDataType::Video), Value::Null);
        assert_eq!(normalize(json!(""), PortDataType::Image), Value::Null);
        assert_eq!(normalize(Value::Null, PortDataType::Model3d), Value::Null);
    }

    #[test]
    fn test_merge_text_concatenates() {
        assert_eq!(
            merge(json!("a"), json!("b"), PortDataType::Text),
            json!("a\nb")
        );
    }

    #[test]
    fn test_merge_images_form_list() {
        assert_eq!(
            merge(json!("img1"), json!("img2"), PortDataType::Image),
            json!(["img1", "img2"])
        );
        assert_eq!(
            merge(json!(["img1", "img2"]), json!("img3"), PortDataType::Image),
            json!(["img1", "img2", "img3"])
        );
    }

    #[test]
    fn test_merge_ignores_null_sides() {
        assert_eq!(merge(Value::Null, json!("a"), PortDataType::Text), json!("a"));
        assert_eq!(merge(json!("a"), Value::Null, PortDataType::Image), json!("a"));
    }

    #[test]
    fn test_media_refs_collects_in_order() {
        let value = json!(["https://x/a.png", {"url": "https://x/b.png"}]);
        assert_eq!(
            media_refs(&value),
            vec!["https://x/a.png".to_string(), "https://x/b.png".to_string()]
        );
        assert_eq!(media_refs(&json!("solo")), vec!["solo".to_string()]);
        assert!(media_refs(&Value::Null).is_empty());
    }
}
