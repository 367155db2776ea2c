//! Decoding of raw `Version` element rows into a field's history.
//!
//! Each row carries `Modified`, `Editor`, and one attribute named after the
//! field's wire name holding the historical value. The service returns rows
//! newest-first; version numbers are assigned so 1 is the oldest.

use std::collections::BTreeMap;

use caml_list_core::{decode, FieldDefinition, FieldValue, FieldVersionCollection, ObjectType};

use crate::version_source::FetchError;

/// One raw `Version` element, attribute name → attribute value.
pub type VersionRow = BTreeMap<String, String>;

const MODIFIED_ATTR: &str = "Modified";
const EDITOR_ATTR: &str = "Editor";

/// Turns the raw rows of one field's version response into a
/// [`FieldVersionCollection`], decoding each value through the core codec.
///
/// Rows arrive newest-first; the oldest row becomes version 1.
pub fn parse_version_rows(
    def: &FieldDefinition,
    rows: &[VersionRow],
) -> Result<FieldVersionCollection, FetchError> {
    let mut collection = FieldVersionCollection::new(&def.mapped_name, def.object_type);
    let total = rows.len() as u32;
    for (idx, row) in rows.iter().enumerate() {
        let version = total - idx as u32;

        let editor = match row.get(EDITOR_ATTR) {
            Some(raw) if !raw.is_empty() => {
                match decode_attr(def, raw, ObjectType::User)? {
                    FieldValue::User(user) => Some(user),
                    _ => None,
                }
            }
            _ => None,
        };
        let modified = match row.get(MODIFIED_ATTR) {
            Some(raw) if !raw.is_empty() => {
                match decode_attr(def, raw, ObjectType::DateTime)? {
                    FieldValue::Date(d) => Some(d),
                    _ => None,
                }
            }
            _ => None,
        };
        let value = match row.get(&def.static_name) {
            Some(raw) => decode_attr(def, raw, def.object_type)?,
            None => def.object_type.default_value(),
        };

        collection.add_version(version, editor, modified, value);
    }
    Ok(collection)
}

fn decode_attr(
    def: &FieldDefinition,
    raw: &str,
    object_type: ObjectType,
) -> Result<FieldValue, FetchError> {
    decode(raw, object_type).map_err(|source| FetchError::Decode {
        field: def.mapped_name.clone(),
        source,
    })
}
