//! Untyped caller values
//!
//! The request body is decoded generically first: every element becomes a
//! [`Dynamic`], and all JSON numbers share the single `f64` representation.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// One caller-supplied value, prior to coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Seq(Vec<Dynamic>),
    /// Object entries in source order.
    Map(Vec<(String, Dynamic)>),
}

impl Dynamic {
    /// Kind name used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "nil",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "float64",
            Dynamic::Text(_) => "string",
            Dynamic::Seq(_) => "slice",
            Dynamic::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// Look up a key of a mapping. Later duplicates win.
    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        match self {
            Dynamic::Map(entries) => entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DynamicVisitor)
    }
}

struct DynamicVisitor;

impl<'de> Visitor<'de> for DynamicVisitor {
    type Value = Dynamic;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Dynamic, E> {
        Ok(Dynamic::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Dynamic, E> {
        Ok(Dynamic::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Dynamic, E> {
        Ok(Dynamic::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Dynamic, E> {
        Ok(Dynamic::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Dynamic, E> {
        Ok(Dynamic::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Dynamic, E> {
        Ok(Dynamic::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Dynamic, E> {
        Ok(Dynamic::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Dynamic, E> {
        Ok(Dynamic::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Dynamic, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Dynamic, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Dynamic::Seq(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Dynamic, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Dynamic>()? {
            entries.push((key, value));
        }
        Ok(Dynamic::Map(entries))
    }
}

/// Whole numbers that an `i64` holds exactly.
fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 1e15
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            // Integral numbers print without a fraction, like the caller wrote them.
            Dynamic::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::Text(s) => serializer.serialize_str(s),
            Dynamic::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Dynamic::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for Dynamic {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Dynamic::Null,
            serde_json::Value::Bool(b) => Dynamic::Bool(b),
            serde_json::Value::Number(n) => Dynamic::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Dynamic::Text(s),
            serde_json::Value::Array(items) => {
                Dynamic::Seq(items.into_iter().map(Dynamic::from).collect())
            }
            serde_json::Value::Object(entries) => Dynamic::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Dynamic::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Dynamic> for serde_json::Value {
    fn from(value: Dynamic) -> Self {
        match value {
            Dynamic::Null => serde_json::Value::Null,
            Dynamic::Bool(b) => serde_json::Value::Bool(b),
            Dynamic::Number(n) if is_integral(n) => serde_json::Value::Number((n as i64).into()),
            Dynamic::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Dynamic::Text(s) => serde_json::Value::String(s),
            Dynamic::Seq(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Dynamic::Map(entries) => serde_json::Value::Object(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_decode_as_f64() {
        let values: Vec<Dynamic> = serde_json::from_str("[1, -2, 3.5, 18446744073709551615]").unwrap();
        assert_eq!(
            values,
            vec![
                Dynamic::Number(1.0),
                Dynamic::Number(-2.0),
                Dynamic::Number(3.5),
                Dynamic::Number(18446744073709551615.0),
            ]
        );
    }

    #[test]
    fn test_nested_decode_keeps_key_order() {
        let value: Dynamic = serde_json::from_str(r#"{"b": [true, null], "a": "x"}"#).unwrap();
        assert_eq!(
            value,
            Dynamic::Map(vec![
                (
                    "b".to_string(),
                    Dynamic::Seq(vec![Dynamic::Bool(true), Dynamic::Null])
                ),
                ("a".to_string(), Dynamic::Text("x".to_string())),
            ])
        );
        assert_eq!(value.get("a").and_then(Dynamic::as_str), Some("x"));
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Dynamic::Number(1.0).kind_name(), "float64");
        assert_eq!(Dynamic::Map(vec![]).kind_name(), "map");
        assert_eq!(Dynamic::Seq(vec![]).kind_name(), "slice");
        assert_eq!(Dynamic::Text(String::new()).kind_name(), "string");
    }

    #[test]
    fn test_json_value_keeps_integral_numbers() {
        let value = Dynamic::Seq(vec![
            Dynamic::Number(1233.0),
            Dynamic::Number(-2.0),
            Dynamic::Number(0.5),
        ]);
        let json: serde_json::Value = value.into();
        assert_eq!(json, serde_json::json!([1233, -2, 0.5]));
        assert_eq!(json.to_string(), "[1233,-2,0.5]");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Dynamic::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(Dynamic::Text("2.5".into()).as_f64(), None);
        assert_eq!(Dynamic::Text("x".into()).as_str(), Some("x"));
        assert_eq!(Dynamic::Null.as_str(), None);
    }

    #[test]
    fn test_serialize_integral_numbers_without_fraction() {
        let value = Dynamic::Seq(vec![Dynamic::Number(1233.0), Dynamic::Number(0.5)]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "[1233,0.5]");
    }
}
