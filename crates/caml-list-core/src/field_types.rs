//! Field type registry: the object-type enumeration, per-type default
//! values, and the per-list field mapping built from field definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decode::FieldValue;

/// Declared type of a list field. Decides how the wire string for that
/// field is decoded and how a typed value is encoded back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Text,
    Note,
    Boolean,
    Calculated,
    Choice,
    Counter,
    Currency,
    DateTime,
    Integer,
    Float,
    Json,
    Lookup,
    LookupMulti,
    User,
    UserMulti,
    MultiChoice,
    Attachments,
    Html,
}

impl ObjectType {
    /// Resolves a wire type tag. Unrecognized tags fall back to [`Text`]:
    /// the service is free to introduce new field types and the forgiving
    /// default keeps old clients decoding them as plain strings.
    ///
    /// Matching is case-insensitive because calculated columns tag their
    /// inner value with lowercase variants ("datetime", "float").
    ///
    /// [`Text`]: ObjectType::Text
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "note" => Self::Note,
            "boolean" => Self::Boolean,
            "calculated" => Self::Calculated,
            "choice" => Self::Choice,
            "counter" => Self::Counter,
            "currency" => Self::Currency,
            "datetime" => Self::DateTime,
            "integer" => Self::Integer,
            "float" | "number" => Self::Float,
            "json" => Self::Json,
            "lookup" => Self::Lookup,
            "lookupmulti" => Self::LookupMulti,
            "user" => Self::User,
            "usermulti" => Self::UserMulti,
            "multichoice" => Self::MultiChoice,
            "attachments" => Self::Attachments,
            "html" => Self::Html,
            _ => Self::Text,
        }
    }

    /// Default value a freshly created record carries for a field of this
    /// type before any wire attribute has been folded in.
    ///
    /// Numeric types default to the empty string rather than zero: the wire
    /// transmits absent numerics as `""` and the decoder passes that through
    /// unchanged, so the default matches what a decode of an empty attribute
    /// would produce.
    pub fn default_value(self) -> FieldValue {
        match self {
            Self::Text | Self::Note | Self::Choice | Self::Html | Self::Calculated => {
                FieldValue::Text(String::new())
            }
            Self::Boolean => FieldValue::Bool(false),
            Self::Counter | Self::Currency | Self::Integer | Self::Float => {
                FieldValue::Text(String::new())
            }
            Self::Json | Self::Lookup | Self::User | Self::DateTime => FieldValue::Null,
            Self::LookupMulti => FieldValue::LookupMulti(Vec::new()),
            Self::UserMulti => FieldValue::UserMulti(Vec::new()),
            Self::MultiChoice => FieldValue::Choices(Vec::new()),
            Self::Attachments => FieldValue::Text(String::new()),
        }
    }
}

/// Canonical definition of a single list field.
///
/// Immutable after list registration except for the server-extended
/// metadata (`choices`, `description`, `display_name`), merged in once per
/// list via [`FieldDefinition::merge_extended_metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Wire attribute name, without the row prefix.
    pub static_name: String,
    /// Property name on the decoded record.
    pub mapped_name: String,
    pub object_type: ObjectType,
    pub read_only: bool,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl FieldDefinition {
    pub fn new(
        static_name: impl Into<String>,
        mapped_name: impl Into<String>,
        object_type: ObjectType,
    ) -> Self {
        Self {
            static_name: static_name.into(),
            mapped_name: mapped_name.into(),
            object_type,
            read_only: false,
            required: false,
            choices: None,
            description: None,
            display_name: None,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Folds server-extended metadata into the definition. Applied once per
    /// list after the schema round-trip; existing values are overwritten so
    /// the definition stays the single source of truth.
    pub fn merge_extended_metadata(
        &mut self,
        choices: Option<Vec<String>>,
        description: Option<String>,
        display_name: Option<String>,
    ) {
        if choices.is_some() {
            self.choices = choices;
        }
        if description.is_some() {
            self.description = description;
        }
        if display_name.is_some() {
            self.display_name = display_name;
        }
    }
}

/// Per-list lookup table from wire attribute name (and mapped property
/// name) to field definition. Built once when a list is registered.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    definitions: Vec<FieldDefinition>,
    by_static: HashMap<String, usize>,
    by_mapped: HashMap<String, usize>,
}

impl FieldMapping {
    pub fn new(definitions: Vec<FieldDefinition>) -> Self {
        let mut by_static = HashMap::with_capacity(definitions.len());
        let mut by_mapped = HashMap::with_capacity(definitions.len());
        for (idx, def) in definitions.iter().enumerate() {
            by_static.insert(def.static_name.clone(), idx);
            by_mapped.insert(def.mapped_name.clone(), idx);
        }
        Self {
            definitions,
            by_static,
            by_mapped,
        }
    }

    pub fn get_by_static(&self, static_name: &str) -> Option<&FieldDefinition> {
        self.by_static.get(static_name).map(|&i| &self.definitions[i])
    }

    pub fn get_by_mapped(&self, mapped_name: &str) -> Option<&FieldDefinition> {
        self.by_mapped.get(mapped_name).map(|&i| &self.definitions[i])
    }

    /// All definitions in registration order (the mappedName universe).
    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_falls_back_to_text() {
        assert_eq!(ObjectType::from_tag("Geolocation"), ObjectType::Text);
        assert_eq!(ObjectType::from_tag(""), ObjectType::Text);
    }

    #[test]
    fn calculated_inner_tags_match_case_insensitively() {
        assert_eq!(ObjectType::from_tag("datetime"), ObjectType::DateTime);
        assert_eq!(ObjectType::from_tag("float"), ObjectType::Float);
        assert_eq!(ObjectType::from_tag("Number"), ObjectType::Float);
    }

    #[test]
    fn mapping_resolves_both_name_spaces() {
        let mapping = FieldMapping::new(vec![FieldDefinition::new(
            "ProjectTitle",
            "title",
            ObjectType::Text,
        )]);
        assert!(mapping.get_by_static("ProjectTitle").is_some());
        assert!(mapping.get_by_mapped("title").is_some());
        assert!(mapping.get_by_static("title").is_none());
    }

    #[test]
    fn extended_metadata_merges_without_clearing() {
        let mut def = FieldDefinition::new("Status", "status", ObjectType::Choice);
        def.merge_extended_metadata(Some(vec!["Open".into(), "Closed".into()]), None, None);
        def.merge_extended_metadata(None, Some("Workflow state".into()), None);
        assert_eq!(def.choices.as_ref().map(Vec::len), Some(2));
        assert_eq!(def.description.as_deref(), Some("Workflow state"));
    }
}
