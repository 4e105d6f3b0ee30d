//! Lenient field deserializers for the trade endpoint's JSON.
//!
//! The remote side is loose with encodings: the same numeric field may arrive
//! as `7` or `"7"`, flags as `1`, `true` or `"true"`, and lists either as JSON
//! arrays or as objects keyed by decimal index. These helpers are meant for
//! `#[serde(default, deserialize_with = "...")]` and treat `null` as the
//! field's default.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr<T> {
    Number(T),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FlagRepr {
    fn truthy(self) -> bool {
        match self {
            FlagRepr::Bool(value) => value,
            FlagRepr::Int(value) => value != 0,
            FlagRepr::Text(text) => {
                let text = text.trim();
                text.eq_ignore_ascii_case("true") || text == "1"
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextRepr {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListRepr<T> {
    List(Vec<T>),
    Indexed(BTreeMap<String, T>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapRepr<T> {
    Map(HashMap<String, T>),
    List(Vec<T>),
}

/// A number that may be encoded as a JSON number or a decimal string.
/// An empty string reads as the default.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + Default,
    T::Err: fmt::Display,
{
    match Option::<NumberRepr<T>>::deserialize(deserializer)? {
        None => Ok(T::default()),
        Some(NumberRepr::Number(value)) => Ok(value),
        Some(NumberRepr::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(T::default())
            } else {
                text.parse().map_err(de::Error::custom)
            }
        }
    }
}

/// A boolean flag encoded as a bool, a `0`/`1` integer, or a string.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<FlagRepr>::deserialize(deserializer)?.is_some_and(FlagRepr::truthy))
}

/// Like [`flag`], but a missing or `null` value reads as `true`.
pub fn flag_default_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<FlagRepr>::deserialize(deserializer)?.map_or(true, FlagRepr::truthy))
}

/// A string identifier that may also arrive as a bare JSON number.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextRepr>::deserialize(deserializer)? {
        None => String::new(),
        Some(TextRepr::Text(text)) => text,
        Some(TextRepr::Unsigned(value)) => value.to_string(),
        Some(TextRepr::Signed(value)) => value.to_string(),
    })
}

/// A list encoded as a JSON array or as an object keyed by decimal index.
/// The object form is returned in ascending numeric key order; keys that are
/// not numbers sort last.
pub fn indexed_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<ListRepr<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ListRepr::List(items)) => items,
        Some(ListRepr::Indexed(map)) => {
            let mut entries: Vec<(u64, T)> = map
                .into_iter()
                .map(|(key, value)| (key.trim().parse().unwrap_or(u64::MAX), value))
                .collect();
            entries.sort_by_key(|(index, _)| *index);
            entries.into_iter().map(|(_, value)| value).collect()
        }
    })
}

/// An object keyed by string. An array (the remote side sends `[]` for an
/// empty object) is keyed by position.
pub fn keyed_map<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<MapRepr<T>>::deserialize(deserializer)? {
        None => HashMap::new(),
        Some(MapRepr::Map(map)) => map,
        Some(MapRepr::List(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug, Default)]
    struct Sample {
        #[serde(default, deserialize_with = "number")]
        count: u64,
        #[serde(default, deserialize_with = "flag")]
        ready: bool,
        #[serde(default = "yes", deserialize_with = "flag_default_true")]
        success: bool,
        #[serde(default, deserialize_with = "text")]
        id: String,
        #[serde(default, deserialize_with = "indexed_list")]
        entries: Vec<u32>,
        #[serde(default, deserialize_with = "keyed_map")]
        lookup: HashMap<String, u32>,
    }

    fn yes() -> bool {
        true
    }

    #[test]
    fn numbers_accept_strings_and_numbers() {
        let a: Sample = serde_json::from_str(r#"{"count": 42}"#).unwrap();
        let b: Sample = serde_json::from_str(r#"{"count": "42"}"#).unwrap();
        let c: Sample = serde_json::from_str(r#"{"count": ""}"#).unwrap();
        assert_eq!(a.count, 42);
        assert_eq!(b.count, 42);
        assert_eq!(c.count, 0);
    }

    #[test]
    fn numbers_reject_garbage() {
        let result: Result<Sample, _> = serde_json::from_str(r#"{"count": "forty"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn flags_accept_every_encoding() {
        for (json, expected) in [
            (r#"{"ready": true}"#, true),
            (r#"{"ready": 1}"#, true),
            (r#"{"ready": "true"}"#, true),
            (r#"{"ready": 0}"#, false),
            (r#"{"ready": "false"}"#, false),
            (r#"{"ready": null}"#, false),
        ] {
            let sample: Sample = serde_json::from_str(json).unwrap();
            assert_eq!(sample.ready, expected, "{json}");
        }
    }

    #[test]
    fn success_defaults_to_true_when_absent() {
        let absent: Sample = serde_json::from_str("{}").unwrap();
        let explicit: Sample = serde_json::from_str(r#"{"success": "false"}"#).unwrap();
        assert!(absent.success);
        assert!(!explicit.success);
    }

    #[test]
    fn text_accepts_bare_numbers() {
        let sample: Sample = serde_json::from_str(r#"{"id": 76561198000000001}"#).unwrap();
        assert_eq!(sample.id, "76561198000000001");
    }

    #[test]
    fn indexed_list_orders_object_form_numerically() {
        let sample: Sample =
            serde_json::from_str(r#"{"entries": {"10": 3, "2": 2, "0": 1}}"#).unwrap();
        assert_eq!(sample.entries, vec![1, 2, 3]);

        let array: Sample = serde_json::from_str(r#"{"entries": [5, 6]}"#).unwrap();
        assert_eq!(array.entries, vec![5, 6]);
    }

    #[test]
    fn keyed_map_treats_empty_array_as_empty_object() {
        let sample: Sample = serde_json::from_str(r#"{"lookup": []}"#).unwrap();
        assert!(sample.lookup.is_empty());

        let sample: Sample = serde_json::from_str(r#"{"lookup": {"a": 1}}"#).unwrap();
        assert_eq!(sample.lookup.get("a"), Some(&1));
    }
}
