//! Typed-value → wire encoding for the editable subset of field types.
//!
//! The outbound save payload is a list of `[staticName, wireString]` pairs
//! embedded into the request XML by the transport layer.

use chrono::{FixedOffset, TimeZone};
use thiserror::Error;

use crate::decode::{FieldValue, Lookup, User, PAIR_DELIMITER};
use crate::field_types::{FieldDefinition, FieldMapping};
use crate::list_item::ListItem;
use crate::xml::escape_text;

/// Delimiter between the ids of a multi-value write; the value half of each
/// entry is left empty since the server resolves it from the id.
const MULTI_WRITE_DELIMITER: &str = ";#;#";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("field `{0}` is read-only and cannot be written")]
    ReadOnly(String),
    #[error("field `{field}` cannot carry a {value_kind} value")]
    Mismatch {
        field: String,
        value_kind: &'static str,
    },
    #[error("JSON field `{field}` failed to serialize: {source}")]
    Json {
        field: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Change(#[from] crate::change_summary::ChangeError),
}

/// Encodes one field value as a `[staticName, wireString]` pair.
///
/// `tz` is the caller's timezone: dates are shifted into it rather than
/// normalized to UTC, matching what the legacy service expects from
/// browser clients.
pub fn encode(
    def: &FieldDefinition,
    value: &FieldValue,
    tz: FixedOffset,
) -> Result<(String, String), EncodeError> {
    if def.read_only {
        return Err(EncodeError::ReadOnly(def.mapped_name.clone()));
    }
    let wire = encode_value(def, value, tz)?;
    Ok((def.static_name.clone(), wire))
}

fn encode_value(
    def: &FieldDefinition,
    value: &FieldValue,
    tz: FixedOffset,
) -> Result<String, EncodeError> {
    let mismatch = |value_kind| EncodeError::Mismatch {
        field: def.mapped_name.clone(),
        value_kind,
    };
    Ok(match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        FieldValue::Int(n) => n.to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Text(s) => escape_text(s),
        FieldValue::Date(naive) => match tz.from_local_datetime(naive).earliest() {
            Some(local) => local.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
            None => return Err(mismatch("nonexistent local datetime")),
        },
        FieldValue::Lookup(lookup) => encode_lookup_id(lookup),
        FieldValue::User(user) => encode_user_id(user),
        FieldValue::LookupMulti(lookups) => lookups
            .iter()
            .map(encode_lookup_id)
            .collect::<Vec<_>>()
            .join(MULTI_WRITE_DELIMITER),
        FieldValue::UserMulti(users) => users
            .iter()
            .map(encode_user_id)
            .collect::<Vec<_>>()
            .join(MULTI_WRITE_DELIMITER),
        FieldValue::Choices(choices) => choices
            .iter()
            .map(|c| escape_text(c))
            .collect::<Vec<_>>()
            .join(PAIR_DELIMITER),
        FieldValue::Json(json) => {
            let serialized = serde_json::to_string(json).map_err(|source| EncodeError::Json {
                field: def.mapped_name.clone(),
                source,
            })?;
            escape_text(&serialized)
        }
    })
}

fn encode_lookup_id(lookup: &Lookup) -> String {
    lookup
        .lookup_id
        .map(|id| id.to_string())
        .unwrap_or_default()
}

fn encode_user_id(user: &User) -> String {
    user.lookup_id.map(|id| id.to_string()).unwrap_or_default()
}

/// Builds the outbound save payload for an item: one pair per field whose
/// current value differs from the pristine snapshot, writable fields only.
pub fn encode_dirty(
    item: &ListItem,
    mapping: &FieldMapping,
    tz: FixedOffset,
) -> Result<Vec<(String, String)>, EncodeError> {
    let summary = item.changes(mapping)?;
    let mut pairs = Vec::with_capacity(summary.change_count());
    for field_name in summary.changed_fields() {
        let def = match mapping.get_by_mapped(field_name) {
            Some(def) => def,
            None => continue,
        };
        let value = item
            .fields
            .get(field_name)
            .unwrap_or(&FieldValue::Null);
        pairs.push(encode(def, value, tz)?);
    }
    Ok(pairs)
}
