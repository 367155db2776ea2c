//! End-to-end lifecycle coverage: attribute row in, pristine tracking,
//! change summaries, and the dirty-field save payload back out.

use chrono::FixedOffset;
use caml_list_core::{
    encode_dirty, parse_row, ChangeError, FieldDefinition, FieldMapping, FieldValue, ListItem,
    ObjectType,
};

fn project_mapping() -> FieldMapping {
    FieldMapping::new(vec![
        FieldDefinition::new("ID", "id", ObjectType::Counter).read_only(),
        FieldDefinition::new("Modified", "modified", ObjectType::DateTime).read_only(),
        FieldDefinition::new("Title", "title", ObjectType::Text).required(),
        FieldDefinition::new("Active", "active", ObjectType::Boolean),
        FieldDefinition::new("Budget", "budget", ObjectType::Currency),
        FieldDefinition::new("Metadata", "metadata", ObjectType::Json),
    ])
}

fn server_row() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ows_ID", "4"),
        ("ows_Modified", "2014-08-29T14:02:18Z"),
        ("ows_Title", "Harbor refit"),
        ("ows_Active", "1"),
        ("ows_Budget", "125000.5"),
        ("ows_Metadata", r#"{"phase": 2}"#),
    ]
}

#[test]
fn parsed_item_round_trips_through_the_lifecycle() {
    let mapping = project_mapping();
    let record = parse_row(server_row(), &mapping).unwrap();
    let mut item = ListItem::from_record(record);

    assert!(item.is_pristine(&mapping).unwrap());
    assert_eq!(item.id(), Some(4));

    item.fields
        .insert("title".into(), FieldValue::Text("Harbor refit, phase 2".into()));
    item.fields.insert("active".into(), FieldValue::Bool(false));

    let summary = item.changes(&mapping).unwrap();
    assert_eq!(summary.change_count(), 2);
    assert!(summary.has_major_changes());
    assert_eq!(summary.get("title").unwrap().old_value, "Harbor refit");
    assert_eq!(summary.get("active").unwrap().new_value, "No");
}

#[test]
fn dirty_payload_covers_exactly_the_changed_writable_fields() {
    let mapping = project_mapping();
    let record = parse_row(server_row(), &mapping).unwrap();
    let mut item = ListItem::from_record(record);
    item.fields.insert("active".into(), FieldValue::Bool(false));

    let tz = FixedOffset::west_opt(7 * 3600).unwrap();
    let pairs = encode_dirty(&item, &mapping, tz).unwrap();
    assert_eq!(pairs, vec![("Active".to_string(), "0".to_string())]);
}

#[test]
fn bad_json_in_one_attribute_leaves_siblings_intact() {
    let mapping = project_mapping();
    let mut row = server_row();
    row[5] = ("ows_Metadata", "{bad json");
    let record = parse_row(row, &mapping).unwrap();

    assert_eq!(record.get("metadata"), Some(&FieldValue::Null));
    assert_eq!(record.get("title"), Some(&FieldValue::Text("Harbor refit".into())));
    assert_eq!(record.get("id"), Some(&FieldValue::Int(4)));
}

#[test]
fn readonly_only_differences_never_count_as_changes() {
    let mapping = project_mapping();
    let record = parse_row(server_row(), &mapping).unwrap();
    let mut item = ListItem::from_record(record);
    item.fields.insert("id".into(), FieldValue::Int(999));
    item.fields.insert(
        "modified".into(),
        FieldValue::Text("tampered".into()),
    );

    let summary = item.changes(&mapping).unwrap();
    assert_eq!(summary.change_count(), 0);
    assert!(item.is_pristine(&mapping).unwrap());
}

#[test]
fn client_sourced_item_requires_a_baseline_before_diffing() {
    let mapping = project_mapping();
    let mut fresh = ListItem::new_empty(&mapping);
    assert!(matches!(
        fresh.changes(&mapping),
        Err(ChangeError::NoPristine { .. })
    ));

    // Adopting a server item as the baseline unblocks the diff.
    let server = ListItem::from_record(parse_row(server_row(), &mapping).unwrap());
    fresh.set_pristine(Some(&server)).unwrap();
    assert!(fresh.is_pristine(&mapping).unwrap());
}

#[test]
fn save_confirmation_becomes_the_new_baseline() {
    let mapping = project_mapping();
    let mut item = ListItem::from_record(parse_row(server_row(), &mapping).unwrap());
    item.fields
        .insert("title".into(), FieldValue::Text("Harbor refit v2".into()));
    assert!(!item.is_pristine(&mapping).unwrap());

    let mut confirmed = server_row();
    confirmed[2] = ("ows_Title", "Harbor refit v2");
    item.commit_saved(parse_row(confirmed, &mapping).unwrap());
    assert!(item.is_pristine(&mapping).unwrap());
}
