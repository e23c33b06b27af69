//! JSON serializer — the stable output format for downstream renderers.
//!
//! The entity list is emitted in first-seen order with serde's derived
//! field order. Duplicate class members collapse here, last wins, at the
//! position of the first occurrence.

use crate::model::{DocModel, FieldEntity, FunctionEntity, Literal};
use anyhow::{Context, Result};
use regex::Regex;
use serde::ser::{Error as _, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static RE_JSON_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap()
});

impl Serialize for DocModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entities())
    }
}

/// Numbers that are valid JSON keep their exact source text; everything
/// else is a string holding the literal verbatim.
impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if RE_JSON_NUMBER.is_match(self.as_str()) {
            let raw = RawValue::from_string(self.0.clone()).map_err(S::Error::custom)?;
            raw.serialize(serializer)
        } else {
            serializer.serialize_str(self.as_str())
        }
    }
}

/// Members keyed by name within their class.
pub trait Named {
    fn member_name(&self) -> &str;
}

impl Named for FieldEntity {
    fn member_name(&self) -> &str {
        &self.name
    }
}

impl Named for FunctionEntity {
    fn member_name(&self) -> &str {
        &self.name
    }
}

/// Serialize members with duplicates collapsed: the last declaration
/// of a name is written where the first one appeared.
#[allow(clippy::ptr_arg)]
pub fn last_wins<S, T>(items: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Named + Serialize,
{
    let mut last: HashMap<&str, usize> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        last.insert(item.member_name(), i);
    }

    let mut seq = serializer.serialize_seq(Some(last.len()))?;
    for item in items {
        if let Some(i) = last.remove(item.member_name()) {
            seq.serialize_element(&items[i])?;
        }
    }
    seq.end()
}

/// Pretty JSON with a trailing newline.
pub fn to_json(model: &DocModel) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(model)?;
    out.push('\n');
    Ok(out)
}

/// Serialize the model to `path`.
pub fn write_json(model: &DocModel, path: &Path) -> Result<()> {
    let json = to_json(model).context("failed to serialize documentation")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassEntity, Entity, GlobalEntity, Location, Param};

    fn field(name: &str, ty: &str) -> FieldEntity {
        FieldEntity {
            owner: "Track".to_string(),
            name: name.to_string(),
            ty: ty.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn numeric_literal_keeps_source_text() {
        let mut model = DocModel::new();
        model.insert(Entity::Global(GlobalEntity {
            name: "renoise.API_VERSION".to_string(),
            ty: "number".to_string(),
            value: Some(Literal("6.10".to_string())),
            ..Default::default()
        }));
        let json = to_json(&model).unwrap();
        assert!(json.contains("\"value\": 6.10\n"), "{}", json);
    }

    #[test]
    fn other_literals_are_strings() {
        for (text, expected) in [
            ("0x1F", "\"0x1F\""),
            ("\"hi\"", "\"\\\"hi\\\"\""),
            ("true", "\"true\""),
            ("1.", "\"1.\""),
        ] {
            let json = serde_json::to_string(&Literal(text.to_string())).unwrap();
            assert_eq!(json, expected);
        }
    }

    #[test]
    fn class_layout_and_last_wins() {
        let mut model = DocModel::new();
        model.upsert_class(ClassEntity {
            name: "Track".to_string(),
            fields: vec![field("name", "string"), field("volume", "number"), field("name", "integer")],
            location: Some(Location::new("track.lua", 3)),
            ..Default::default()
        });
        let json = to_json(&model).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["kind"], "class");
        assert_eq!(json.find("\"kind\""), Some(json.find('{').unwrap() + 6));
        let fields = value[0]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["name"], "name");
        assert_eq!(fields[0]["type"], "integer");
        assert_eq!(fields[1]["name"], "volume");
        assert!(value[0].get("methods").is_none());
        assert!(value[0].get("deprecated").is_none());
        assert_eq!(value[0]["location"]["line"], 3);
        assert!(json.ends_with("]\n"));
    }

    #[test]
    fn params_always_carry_optional() {
        let param = Param {
            name: "message".to_string(),
            ty: "string".to_string(),
            optional: false,
            description: None,
        };
        assert_eq!(
            serde_json::to_string(&param).unwrap(),
            r#"{"name":"message","type":"string","optional":false}"#
        );
    }

    #[test]
    fn write_json_reports_path() {
        let model = DocModel::new();
        let err = write_json(&model, Path::new("/nonexistent-dir/doc.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/doc.json"));
    }
}
