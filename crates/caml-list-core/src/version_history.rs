//! Reconstruction of per-field version histories into a consolidated
//! per-version timeline.
//!
//! The service exposes version history one field at a time. Each field's
//! history is folded into a collection of full-entity snapshots keyed by
//! version number, and the change summary is the ascending pairwise diff
//! across those snapshots.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::change_summary::{diff_records, FieldChangeSummary};
use crate::decode::{FieldValue, User};
use crate::entity::EntityRecord;
use crate::field_types::{FieldMapping, ObjectType};

/// One historical value of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldVersion {
    pub editor: Option<User>,
    pub modified: Option<NaiveDateTime>,
    pub value: FieldValue,
    pub version: u32,
}

/// The full history of a single field: version number → entry. Keys are
/// unique; re-adding a version overwrites the earlier entry.
#[derive(Debug, Clone, Serialize)]
pub struct FieldVersionCollection {
    pub mapped_name: String,
    pub object_type: ObjectType,
    versions: BTreeMap<u32, FieldVersion>,
}

impl FieldVersionCollection {
    pub fn new(mapped_name: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            mapped_name: mapped_name.into(),
            object_type,
            versions: BTreeMap::new(),
        }
    }

    pub fn add_version(
        &mut self,
        version: u32,
        editor: Option<User>,
        modified: Option<NaiveDateTime>,
        value: FieldValue,
    ) {
        self.versions.insert(
            version,
            FieldVersion {
                editor,
                modified,
                value,
                version,
            },
        );
    }

    pub fn versions(&self) -> &BTreeMap<u32, FieldVersion> {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// A synthesized full-entity snapshot for one version number.
#[derive(Debug, Clone, Serialize)]
pub struct VersionSnapshot {
    pub version: u32,
    pub editor: Option<User>,
    pub modified: Option<NaiveDateTime>,
    pub fields: EntityRecord,
}

/// All reconstructed snapshots, keyed by version number.
///
/// Known gap, reproduced deliberately: when two fields report
/// non-overlapping version-number sets, a snapshot only carries the fields
/// whose collections mentioned that version. Consumers rendering a
/// snapshot as a complete entity must treat absent fields as
/// "unchanged since an earlier version", not as cleared.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionHistoryCollection {
    snapshots: BTreeMap<u32, VersionSnapshot>,
}

/// One entry of the consolidated timeline.
#[derive(Debug, Clone, Serialize)]
pub struct VersionSummary {
    pub version: u32,
    pub editor: Option<User>,
    pub modified: Option<NaiveDateTime>,
    pub changes: FieldChangeSummary,
}

impl VersionSummary {
    pub fn has_major_changes(&self) -> bool {
        self.changes.has_major_changes()
    }
}

/// The ascending timeline of pairwise version diffs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSummary {
    pub versions: Vec<VersionSummary>,
    /// Number of versions in which at least one non-readonly field really
    /// changed.
    pub significant_version_count: usize,
}

impl VersionHistoryCollection {
    /// Folds every field's history into per-version snapshots.
    ///
    /// The snapshot for a version number is created lazily by the first
    /// field that mentions it, carrying that entry's editor and modified
    /// stamp; later fields folding into the same version only contribute
    /// their value.
    pub fn build(collections: &[FieldVersionCollection]) -> Self {
        let mut snapshots: BTreeMap<u32, VersionSnapshot> = BTreeMap::new();
        for collection in collections {
            for (&version, entry) in collection.versions() {
                let snapshot = snapshots.entry(version).or_insert_with(|| VersionSnapshot {
                    version,
                    editor: entry.editor.clone(),
                    modified: entry.modified,
                    fields: EntityRecord::new(),
                });
                snapshot
                    .fields
                    .insert(collection.mapped_name.clone(), entry.value.clone());
            }
        }
        Self { snapshots }
    }

    pub fn get(&self, version: u32) -> Option<&VersionSnapshot> {
        self.snapshots.get(&version)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionSnapshot> {
        self.snapshots.values()
    }

    /// Walks the snapshots in ascending version order, diffing each against
    /// its predecessor. The oldest version is diffed against an empty
    /// record, so its summary lists every populated non-readonly field.
    pub fn generate_change_summary(&self, mapping: &FieldMapping) -> ChangeSummary {
        let empty = EntityRecord::new();
        let mut summary = ChangeSummary::default();
        let mut previous: Option<&VersionSnapshot> = None;
        for snapshot in self.snapshots.values() {
            let (older_fields, older_version) = match previous {
                Some(prev) => (&prev.fields, prev.version),
                None => (&empty, 0),
            };
            let changes = diff_records(
                &snapshot.fields,
                older_fields,
                mapping,
                Some((older_version, snapshot.version)),
            );
            if changes.has_major_changes() {
                summary.significant_version_count += 1;
            }
            summary.versions.push(VersionSummary {
                version: snapshot.version,
                editor: snapshot.editor.clone(),
                modified: snapshot.modified,
                changes,
            });
            previous = Some(snapshot);
        }
        summary
    }
}
