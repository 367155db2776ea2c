//! Asynchronous assembly of version histories.
//!
//! The service only exposes version history one field at a time, so a full
//! history is a fan-out of one request per field joined into a single
//! [`VersionHistoryCollection`](caml_list_core::VersionHistoryCollection).
//! The join is all-or-nothing: a collection assembled from a subset of
//! fields is incomplete by construction, so any per-field failure fails
//! the whole build and no partial collection escapes.

pub mod version_rows;
pub mod version_source;

pub use version_rows::{parse_version_rows, VersionRow};
pub use version_source::{fetch_version_history, FetchError, FieldVersionSource};
