//! The list-item lifecycle: an entity record plus the pristine snapshot it
//! is diffed against.
//!
//! Items are composed, not inherited: identity accessors read well-known
//! mapped fields out of the record instead of duplicating them as struct
//! members, so a server merge can never leave the two out of sync.

use chrono::NaiveDateTime;

use crate::change_summary::{diff_records, ChangeError, FieldChangeSummary};
use crate::decode::{FieldValue, Lookup, User};
use crate::entity::EntityRecord;
use crate::field_types::FieldMapping;

/// Mapped names of the identity fields every list carries.
const ID: &str = "id";
const CREATED: &str = "created";
const MODIFIED: &str = "modified";
const AUTHOR: &str = "author";
const EDITOR: &str = "editor";
const PERM_MASK: &str = "permMask";
const UNIQUE_ID: &str = "uniqueId";
const FILE_REF: &str = "fileRef";

/// A single list item: its current fields and, when server-sourced, the
/// pristine snapshot captured at load time.
#[derive(Debug, Clone)]
pub struct ListItem {
    pub fields: EntityRecord,
    pristine: Option<EntityRecord>,
}

impl ListItem {
    /// Wraps a server-sourced record. The record as parsed becomes the
    /// pristine snapshot.
    pub fn from_record(fields: EntityRecord) -> Self {
        let pristine = Some(fields.clone());
        Self { fields, pristine }
    }

    /// Builds a client-sourced item: no id, every field at its type
    /// default, no pristine snapshot until the first save round-trips.
    pub fn new_empty(mapping: &FieldMapping) -> Self {
        let mut fields = EntityRecord::with_capacity(mapping.len());
        for def in mapping.definitions() {
            fields.insert(def.mapped_name.clone(), def.object_type.default_value());
        }
        Self {
            fields,
            pristine: None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self.fields.get(ID) {
            Some(FieldValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.date_field(CREATED)
    }

    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.date_field(MODIFIED)
    }

    pub fn author(&self) -> Option<&User> {
        self.user_field(AUTHOR)
    }

    pub fn editor(&self) -> Option<&User> {
        self.user_field(EDITOR)
    }

    pub fn perm_mask(&self) -> Option<&str> {
        match self.fields.get(PERM_MASK) {
            Some(FieldValue::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn unique_id(&self) -> Option<&str> {
        match self.fields.get(UNIQUE_ID) {
            Some(FieldValue::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn file_ref(&self) -> Option<&Lookup> {
        match self.fields.get(FILE_REF) {
            Some(FieldValue::Lookup(l)) => Some(l),
            _ => None,
        }
    }

    fn date_field(&self, name: &str) -> Option<NaiveDateTime> {
        match self.fields.get(name) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    fn user_field(&self, name: &str) -> Option<&User> {
        match self.fields.get(name) {
            Some(FieldValue::User(u)) => Some(u),
            _ => None,
        }
    }

    pub fn pristine(&self) -> Option<&EntityRecord> {
        self.pristine.as_ref()
    }

    /// Diffs the current fields against the pristine snapshot.
    pub fn changes(&self, mapping: &FieldMapping) -> Result<FieldChangeSummary, ChangeError> {
        let pristine = self.pristine.as_ref().ok_or(ChangeError::NoPristine {
            operation: "changes",
        })?;
        Ok(diff_records(&self.fields, pristine, mapping, None))
    }

    pub fn is_pristine(&self, mapping: &FieldMapping) -> Result<bool, ChangeError> {
        Ok(!self.changes(mapping)?.has_major_changes())
    }

    /// Resets the current fields to the pristine snapshot, or, when a
    /// source item is supplied, reinitializes from it (the source's current
    /// fields become both this item's fields and its snapshot).
    pub fn set_pristine(&mut self, source: Option<&ListItem>) -> Result<(), ChangeError> {
        match source {
            Some(src) => {
                self.fields = src.fields.clone();
                self.pristine = Some(src.fields.clone());
                Ok(())
            }
            None => {
                let pristine = self.pristine.clone().ok_or(ChangeError::NoPristine {
                    operation: "set_pristine",
                })?;
                self.fields = pristine;
                Ok(())
            }
        }
    }

    /// Folds the server-confirmed record from a successful save into the
    /// item and promotes the result to the new pristine snapshot.
    pub fn commit_saved(&mut self, server_record: EntityRecord) {
        for (name, value) in server_record {
            self.fields.insert(name, value);
        }
        self.pristine = Some(self.fields.clone());
    }
}
