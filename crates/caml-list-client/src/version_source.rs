//! The per-field fetch abstraction and the fan-out/fan-in join.

use async_trait::async_trait;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::debug;

use caml_list_core::{
    DecodeError, FieldDefinition, FieldVersionCollection, VersionHistoryCollection,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("version fetch for field `{field}` failed: {message}")]
    Field { field: String, message: String },
    #[error("version row for field `{field}` failed to decode: {source}")]
    Decode {
        field: String,
        source: DecodeError,
    },
    #[error("fetch was cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One version-history request for one field. Implemented by the transport
/// layer; the mock implementations in the tests stand in for it.
#[async_trait]
pub trait FieldVersionSource {
    async fn field_versions(
        &self,
        def: &FieldDefinition,
    ) -> Result<FieldVersionCollection, FetchError>;
}

/// Fans out one request per definition, joins them, and builds the
/// consolidated history.
///
/// The merge never starts on a partial result set: `try_join_all`
/// short-circuits on the first failure and the accumulated collections are
/// discarded with it. Cancellation of the returned future tears down every
/// in-flight request the same way.
pub async fn fetch_version_history<S>(
    source: &S,
    definitions: &[FieldDefinition],
) -> Result<VersionHistoryCollection, FetchError>
where
    S: FieldVersionSource + Sync,
{
    let collections = try_join_all(
        definitions
            .iter()
            .map(|def| source.field_versions(def)),
    )
    .await?;
    debug!(
        fields = definitions.len(),
        versions = collections.iter().map(FieldVersionCollection::len).sum::<usize>(),
        "assembling version history"
    );
    Ok(VersionHistoryCollection::build(&collections))
}
