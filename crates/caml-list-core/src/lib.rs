//! Core marshaling and change-tracking primitives for legacy document-list
//! web services.
//!
//! The wire protocol transmits every field value as a string, type-tagged
//! only by the field's declared object type. This crate owns the
//! bidirectional conversion between those wire strings and typed values,
//! the assembly of attribute rows into entity records, the pristine-snapshot
//! lifecycle of a list item, and the reconstruction of per-field version
//! histories into a consolidated change timeline.

pub mod change_summary;
pub mod decode;
pub mod display;
pub mod encode;
pub mod entity;
pub mod field_types;
pub mod list_item;
pub mod version_history;
pub mod xml;

pub use change_summary::{diff_records, ChangeError, FieldChange, FieldChangeSummary};
pub use decode::{decode, DecodeError, FieldValue, Lookup, User};
pub use display::format_value;
pub use encode::{encode, encode_dirty, EncodeError};
pub use entity::{parse_row, parse_row_loose, EntityRecord, WIRE_PREFIX};
pub use field_types::{FieldDefinition, FieldMapping, ObjectType};
pub use list_item::ListItem;
pub use version_history::{
    ChangeSummary, FieldVersion, FieldVersionCollection, VersionHistoryCollection,
    VersionSnapshot, VersionSummary,
};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
