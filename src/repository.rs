use crate::codec;
use crate::person::Person;
use crate::store::{ObjectStore, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Read-modify-write access to the persisted CSV document
///
/// Every mutation goes through the whole document: download, decode,
/// re-encode, overwrite. There is no optimistic concurrency check, so two
/// concurrent `save` calls based on stale `load` results lose one writer's
/// rows (last-write-wins at the object level).
pub struct PersonRepository {
    store: Arc<dyn ObjectStore>,
}

impl PersonRepository {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Download and decode the current document
    ///
    /// An absent object is an empty document, not an error.
    pub async fn load(&self) -> Result<Vec<Person>, StoreError> {
        match self.store.get().await? {
            Some(body) => {
                let records =
                    codec::decode(&body).map_err(|e| StoreError::Read(e.to_string()))?;

                debug!(records = records.len(), "Document loaded");
                Ok(records)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Encode and upload the full record sequence, overwriting the
    /// previous document
    pub async fn save(&self, records: &[Person]) -> Result<(), StoreError> {
        let body =
            codec::encode(records).map_err(|e| StoreError::Write(e.to_string()))?;

        self.store.put(body.into_bytes()).await
    }
}
