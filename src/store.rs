//! # Credential Store
//!
//! Issued credentials are kept by id for listing, lookup, removal and the
//! tamper check performed during verification.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::credential::Credential;
use crate::error::Err;
use crate::{tracerr, Result};

/// `Store` is used by implementers to provide credential storage.
///
/// An id maps to at most one credential and stored credentials are never
/// modified.
pub trait Store: Send + Sync {
    /// Store a newly issued credential.
    ///
    /// # Errors
    ///
    /// Returns a `conflict` error if a credential with the same id exists.
    fn put(&self, credential: Credential) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a credential by id, returning `None` if there is no match.
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Credential>>> + Send;

    /// Remove a credential. Returns `false` if no credential had the id.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// All stored credentials, oldest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Credential>>> + Send;
}

/// In-memory [`Store`]. Contents live as long as the process.
///
/// Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    credentials: Arc<DashMap<String, Credential>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn put(&self, credential: Credential) -> Result<()> {
        match self.credentials.entry(credential.id.clone()) {
            Entry::Occupied(_) => {
                tracerr!(Err::Conflict, "credential {} already exists", credential.id);
            }
            Entry::Vacant(entry) => {
                entry.insert(credential);
            }
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Credential>> {
        Ok(self.credentials.get(id).map(|c| c.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.credentials.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<Credential>> {
        let mut all = self.credentials.iter().map(|c| c.value().clone()).collect::<Vec<_>>();
        all.sort_by(|a, b| a.issued_at.cmp(&b.issued_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}
