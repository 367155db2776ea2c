//! Assembly of raw attribute rows into typed entity records.

use indexmap::IndexMap;

use crate::decode::{decode, DecodeError, FieldValue};
use crate::field_types::FieldMapping;

/// Prefix the service prepends to every row attribute name.
pub const WIRE_PREFIX: &str = "ows_";

/// A decoded entity: mapped property name → typed value, in field
/// registration order.
pub type EntityRecord = IndexMap<String, FieldValue>;

/// Parses one attribute row against a field mapping.
///
/// Every mapped field is present in the output even when the row omits its
/// attribute: absent fields carry the type default. Attributes with no
/// mapping entry are dropped. The attribute names are expected with the
/// wire prefix already present; unprefixed names are tolerated since some
/// service operations return them bare.
pub fn parse_row<'a, I>(attrs: I, mapping: &FieldMapping) -> Result<EntityRecord, DecodeError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut record = EntityRecord::with_capacity(mapping.len());
    for def in mapping.definitions() {
        record.insert(def.mapped_name.clone(), def.object_type.default_value());
    }
    for (name, raw) in attrs {
        let static_name = name.strip_prefix(WIRE_PREFIX).unwrap_or(name);
        if let Some(def) = mapping.get_by_static(static_name) {
            record.insert(def.mapped_name.clone(), decode(raw, def.object_type)?);
        }
    }
    Ok(record)
}

/// Secondary, mapping-free mode used by the generic collection-to-JSON
/// utility: strips the wire prefix and keeps every attribute under its raw
/// name, decoded as plain text.
pub fn parse_row_loose<'a, I>(attrs: I) -> EntityRecord
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut record = EntityRecord::new();
    for (name, raw) in attrs {
        let name = name.strip_prefix(WIRE_PREFIX).unwrap_or(name);
        let value = FieldValue::Text(crate::xml::unescape_entities(raw));
        record.insert(name.to_string(), value);
    }
    record
}
