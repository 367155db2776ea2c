//! Reconstruction of a consolidated timeline from per-field histories.

use chrono::NaiveDate;
use caml_list_core::{
    FieldDefinition, FieldMapping, FieldValue, FieldVersionCollection, ObjectType, User,
    VersionHistoryCollection,
};

fn mapping() -> FieldMapping {
    FieldMapping::new(vec![
        FieldDefinition::new("Title", "title", ObjectType::Text),
        FieldDefinition::new("Status", "status", ObjectType::Choice),
    ])
}

fn editor(id: i64, name: &str) -> Option<User> {
    Some(User::from_wire(&id.to_string(), name))
}

fn stamp(day: u32) -> Option<chrono::NaiveDateTime> {
    NaiveDate::from_ymd_opt(2014, 8, day).and_then(|d| d.and_hms_opt(9, 0, 0))
}

fn history() -> VersionHistoryCollection {
    let mut title = FieldVersionCollection::new("title", ObjectType::Text);
    title.add_version(1, editor(5, "Jane"), stamp(1), FieldValue::Text("Draft".into()));
    title.add_version(2, editor(5, "Jane"), stamp(2), FieldValue::Text("Draft".into()));
    title.add_version(3, editor(8, "Raj"), stamp(3), FieldValue::Text("Final".into()));

    let mut status = FieldVersionCollection::new("status", ObjectType::Choice);
    status.add_version(1, editor(5, "Jane"), stamp(1), FieldValue::Text("Open".into()));
    status.add_version(2, editor(5, "Jane"), stamp(2), FieldValue::Text("Open".into()));
    status.add_version(3, editor(8, "Raj"), stamp(3), FieldValue::Text("Closed".into()));

    VersionHistoryCollection::build(&[title, status])
}

#[test]
fn timeline_orders_ascending_and_counts_significant_versions() {
    let summary = history().generate_change_summary(&mapping());

    let versions: Vec<u32> = summary.versions.iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);

    // Version 2 repeats version 1's content, so it is not significant.
    assert!(summary.versions[0].has_major_changes());
    assert!(!summary.versions[1].has_major_changes());
    assert!(summary.versions[2].has_major_changes());
    assert_eq!(summary.significant_version_count, 2);
}

#[test]
fn later_diffs_run_against_the_previous_versions_final_content() {
    let summary = history().generate_change_summary(&mapping());
    let v3 = &summary.versions[2];
    let title_change = v3.changes.get("title").unwrap();
    assert_eq!(title_change.old_value, "Draft");
    assert_eq!(title_change.new_value, "Final");
    assert_eq!(title_change.previous_version, 2);
    assert_eq!(title_change.newer_version, 3);
}

#[test]
fn summaries_carry_the_version_editor_and_stamp() {
    let summary = history().generate_change_summary(&mapping());
    let v3 = &summary.versions[2];
    assert_eq!(v3.editor.as_ref().map(|e| e.lookup_value.as_str()), Some("Raj"));
    assert_eq!(v3.modified, stamp(3));
}

#[test]
fn field_missing_from_a_version_is_absent_from_that_snapshot() {
    // `status` has no version-1 entry: the reconstruction leaves the slot
    // out of the version-1 snapshot rather than inventing a value. The
    // first diff therefore reports only the fields that were present.
    let mut title = FieldVersionCollection::new("title", ObjectType::Text);
    title.add_version(1, None, None, FieldValue::Text("Draft".into()));
    title.add_version(2, None, None, FieldValue::Text("Draft".into()));
    let mut status = FieldVersionCollection::new("status", ObjectType::Choice);
    status.add_version(2, None, None, FieldValue::Text("Open".into()));

    let history = VersionHistoryCollection::build(&[title, status]);
    assert!(!history.get(1).unwrap().fields.contains_key("status"));

    let summary = history.generate_change_summary(&mapping());
    assert!(summary.versions[0].changes.get("status").is_none());
    // Version 2 then reports `status` as newly visible content.
    assert_eq!(summary.versions[1].changes.get("status").unwrap().new_value, "Open");
}
