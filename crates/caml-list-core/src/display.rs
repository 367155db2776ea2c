//! Human-readable rendering of typed field values, independent of the wire
//! codec. The change diff compares these strings as its second guard, so a
//! value rebuilt with fresh object identity but the same display content is
//! not reported as a change.

use crate::decode::FieldValue;
use crate::field_types::ObjectType;

/// Formats a value for display according to its declared type.
pub fn format_value(value: &FieldValue, object_type: ObjectType) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        FieldValue::Int(n) => n.to_string(),
        FieldValue::Float(f) => match object_type {
            ObjectType::Currency => format!("${f:.2}"),
            _ => f.to_string(),
        },
        FieldValue::Text(s) => s.clone(),
        FieldValue::Date(d) => d.format("%Y-%m-%d %H:%M").to_string(),
        FieldValue::Json(json) => json.to_string(),
        FieldValue::Lookup(lookup) => lookup.lookup_value.clone(),
        FieldValue::User(user) => user.lookup_value.clone(),
        FieldValue::LookupMulti(lookups) => lookups
            .iter()
            .map(|l| l.lookup_value.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        FieldValue::UserMulti(users) => users
            .iter()
            .map(|u| u.lookup_value.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        FieldValue::Choices(choices) => choices.join(", "),
    }
}
