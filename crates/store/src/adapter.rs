//! Primary/fallback persistence for annotation records
//!
//! A save that fails on the primary store falls back silently; the caller
//! only sees an error when every configured tier fails. A fallback-tier
//! record is still found on load, so a degraded save is not a lost save.

use crate::{storage_key, KeyValueStore, PersistedRecord, Result, StoreError};

/// Writes annotation records through a primary store with an optional
/// fallback tier
pub struct PersistenceAdapter {
    primary: Box<dyn KeyValueStore>,
    fallback: Option<Box<dyn KeyValueStore>>,
}

impl PersistenceAdapter {
    /// Create an adapter over a single store
    pub fn new(primary: Box<dyn KeyValueStore>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Add a fallback tier consulted only when the primary fails
    pub fn with_fallback(mut self, fallback: Box<dyn KeyValueStore>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Persist a record under its document identity.
    ///
    /// Primary failure is logged and absorbed by the fallback; an error is
    /// returned only when no tier accepted the write.
    pub fn save(&mut self, identity: &str, record: &PersistedRecord) -> Result<()> {
        let key = storage_key(identity);
        let value = record.to_json()?;

        let primary_err = match self.primary.set(&key, &value) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(
            store = self.primary.name(),
            error = %primary_err,
            "primary store rejected save, trying fallback"
        );

        match self.fallback.as_mut() {
            Some(fallback) => fallback.set(&key, &value).map_err(|fallback_err| {
                StoreError::Unavailable(format!(
                    "primary: {primary_err}; fallback: {fallback_err}"
                ))
            }),
            None => Err(StoreError::Unavailable(format!("primary: {primary_err}"))),
        }
    }

    /// Load the record for a document identity.
    ///
    /// A missing record is `Ok(None)`. Read failures follow the same
    /// primary-then-fallback path as saves.
    pub fn load(&self, identity: &str) -> Result<Option<PersistedRecord>> {
        let key = storage_key(identity);

        let primary_err = match self.primary.get(&key) {
            Ok(Some(json)) => return Ok(Some(PersistedRecord::from_json(&json)?)),
            Ok(None) => {
                // The primary answered; a fallback may still hold a record
                // written while the primary was degraded
                match &self.fallback {
                    Some(fallback) => {
                        return match fallback.get(&key)? {
                            Some(json) => Ok(Some(PersistedRecord::from_json(&json)?)),
                            None => Ok(None),
                        };
                    }
                    None => return Ok(None),
                }
            }
            Err(e) => e,
        };
        tracing::warn!(
            store = self.primary.name(),
            error = %primary_err,
            "primary store rejected load, trying fallback"
        );

        match &self.fallback {
            Some(fallback) => match fallback.get(&key) {
                Ok(Some(json)) => Ok(Some(PersistedRecord::from_json(&json)?)),
                Ok(None) => Ok(None),
                Err(fallback_err) => Err(StoreError::Unavailable(format!(
                    "primary: {primary_err}; fallback: {fallback_err}"
                ))),
            },
            None => Err(StoreError::Unavailable(format!("primary: {primary_err}"))),
        }
    }
}
