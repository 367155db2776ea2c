//! Fan-out/fan-in semantics: one request per field, joined all-or-nothing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use caml_list_core::{
    FieldDefinition, FieldMapping, FieldValue, FieldVersionCollection, ObjectType,
};
use caml_list_client::{fetch_version_history, FetchError, FieldVersionSource};

fn definitions() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("Title", "title", ObjectType::Text),
        FieldDefinition::new("Status", "status", ObjectType::Choice),
        FieldDefinition::new("Estimate", "estimate", ObjectType::Float),
    ]
}

/// Serves canned per-field histories, optionally failing one field.
struct CannedSource {
    fail_field: Option<&'static str>,
    requests: AtomicUsize,
}

impl CannedSource {
    fn new(fail_field: Option<&'static str>) -> Self {
        Self {
            fail_field,
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FieldVersionSource for CannedSource {
    async fn field_versions(
        &self,
        def: &FieldDefinition,
    ) -> Result<FieldVersionCollection, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_field == Some(def.static_name.as_str()) {
            return Err(FetchError::field(&def.mapped_name, "503 from versions.asmx"));
        }
        let mut coll = FieldVersionCollection::new(&def.mapped_name, def.object_type);
        coll.add_version(1, None, None, FieldValue::Text(format!("{} v1", def.mapped_name)));
        coll.add_version(2, None, None, FieldValue::Text(format!("{} v2", def.mapped_name)));
        Ok(coll)
    }
}

#[tokio::test]
async fn all_fields_resolve_into_one_consolidated_history() {
    let source = CannedSource::new(None);
    let defs = definitions();
    let history = fetch_version_history(&source, &defs).await.unwrap();

    assert_eq!(source.requests.load(Ordering::SeqCst), defs.len());
    assert_eq!(history.len(), 2);
    let v2 = history.get(2).unwrap();
    assert_eq!(v2.fields.len(), defs.len());
    assert_eq!(v2.fields.get("status"), Some(&FieldValue::Text("status v2".into())));
}

#[tokio::test]
async fn one_failed_field_fails_the_whole_build() {
    let source = CannedSource::new(Some("Status"));
    let defs = definitions();
    let err = fetch_version_history(&source, &defs).await.unwrap_err();

    match err {
        FetchError::Field { field, message } => {
            assert_eq!(field, "status");
            assert!(message.contains("503"));
        }
        other => panic!("expected field failure, got {other:?}"),
    }
    // No partial history escapes; the only observable result is the error.
}

#[tokio::test]
async fn empty_definition_set_builds_an_empty_history() {
    let source = CannedSource::new(None);
    let history = fetch_version_history(&source, &[]).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn summary_generation_composes_with_the_fetched_history() {
    let source = CannedSource::new(None);
    let defs = definitions();
    let mapping = FieldMapping::new(defs.clone());
    let history = fetch_version_history(&source, &defs).await.unwrap();

    let summary = history.generate_change_summary(&mapping);
    assert_eq!(summary.versions.len(), 2);
    assert_eq!(summary.significant_version_count, 2);
    assert_eq!(
        summary.versions[1].changes.get("title").unwrap().old_value,
        "title v1"
    );
}
