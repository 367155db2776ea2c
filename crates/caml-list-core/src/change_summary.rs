//! Field-level diffing between two entity snapshots.
//!
//! The comparison runs in two stages. A structural stage serializes both
//! values and compares the strings (the cheap screen); a formatted stage
//! then renders both through the display codec and only records a change
//! when the display strings differ too. The second stage keeps a value
//! rebuilt with new object identity but identical content out of the
//! summary.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::decode::FieldValue;
use crate::display::format_value;
use crate::entity::EntityRecord;
use crate::field_types::FieldMapping;

#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("cannot compute changes for `{operation}`: no pristine snapshot is available")]
    NoPristine { operation: &'static str },
}

/// One changed field between two snapshots, display-formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field_name: String,
    pub new_value: String,
    pub old_value: String,
    pub previous_version: u32,
    pub newer_version: u32,
}

/// The set of non-readonly fields whose display value differs between two
/// snapshots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldChangeSummary {
    changes: IndexMap<String, FieldChange>,
}

impl FieldChangeSummary {
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn has_major_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn get(&self, field_name: &str) -> Option<&FieldChange> {
        self.changes.get(field_name)
    }

    /// Names of the changed fields, in record order.
    pub fn changed_fields(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.values()
    }
}

fn structural_key(value: &FieldValue) -> String {
    // Serialization failure would mean a non-representable float; the wire
    // never produces one, and a lossy key only risks a spurious diff entry.
    serde_json::to_string(value).unwrap_or_default()
}

/// Diffs `newer` against `older` field-by-field.
///
/// Fields with no definition in the mapping are skipped silently, as are
/// read-only definitions; neither belongs in a user-facing change summary.
/// `versions` tags each recorded change with the (previous, newer) version
/// pair when the diff is part of a history fold.
pub fn diff_records(
    newer: &EntityRecord,
    older: &EntityRecord,
    mapping: &FieldMapping,
    versions: Option<(u32, u32)>,
) -> FieldChangeSummary {
    let (previous_version, newer_version) = versions.unwrap_or((0, 0));
    let mut summary = FieldChangeSummary::default();
    for (field_name, new_value) in newer {
        let def = match mapping.get_by_mapped(field_name) {
            Some(def) if !def.read_only => def,
            _ => continue,
        };
        let old_value = older.get(field_name).unwrap_or(&FieldValue::Null);
        if structural_key(new_value) == structural_key(old_value) {
            continue;
        }
        let new_display = format_value(new_value, def.object_type);
        let old_display = format_value(old_value, def.object_type);
        if new_display == old_display {
            continue;
        }
        summary.changes.insert(
            field_name.clone(),
            FieldChange {
                field_name: field_name.clone(),
                new_value: new_display,
                old_value: old_display,
                previous_version,
                newer_version,
            },
        );
    }
    summary
}
