//! Rule table sources and the per-edition cache
//!
//! The store is built by the composition root and handed to the engine.
//! Each edition is fetched, parsed and validated at most once: concurrent
//! first requests wait on the same load and all see the same tables or the
//! same error.

use super::RuleTableSet;
use crate::error::DataError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub(crate) const IBC_2021_DOCUMENT: &str = include_str!("../../tables/IBC-2021.json");

/// Produces the raw table document for an edition
pub trait TableSource: Send + Sync {
    fn fetch(&self, edition: &str) -> Result<String, DataError>;
}

/// Editions compiled into the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    pub const EDITIONS: &'static [&'static str] = &["IBC-2021"];
}

impl TableSource for EmbeddedSource {
    fn fetch(&self, edition: &str) -> Result<String, DataError> {
        match edition {
            "IBC-2021" => Ok(IBC_2021_DOCUMENT.to_string()),
            _ => Err(DataError::EditionNotFound(edition.to_string())),
        }
    }
}

/// Editions stored as `<root>/<edition>.json`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Edition names map straight onto file names, so keep them to a safe alphabet
    fn is_safe_name(edition: &str) -> bool {
        !edition.is_empty()
            && !edition.starts_with('.')
            && edition
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }
}

impl TableSource for DirectorySource {
    fn fetch(&self, edition: &str) -> Result<String, DataError> {
        if !Self::is_safe_name(edition) {
            return Err(DataError::EditionNotFound(edition.to_string()));
        }

        let path = self.root.join(format!("{}.json", edition));
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataError::EditionNotFound(edition.to_string()),
            _ => DataError::Read {
                edition: edition.to_string(),
                reason: format!("{}: {}", path.display(), e),
            },
        })
    }
}

type Slot = Arc<OnceLock<Result<Arc<RuleTableSet>, DataError>>>;

/// Read-through cache of validated rule tables keyed by edition
pub struct TableStore {
    source: Box<dyn TableSource>,
    editions: Mutex<HashMap<String, Slot>>,
}

impl TableStore {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            editions: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by the editions compiled into the binary
    pub fn embedded() -> Self {
        Self::new(EmbeddedSource)
    }

    /// Get the tables for an edition, loading them on first use
    ///
    /// A failed load of an edition the source has is cached like a successful
    /// one; call [`evict`](Self::evict) to allow another attempt. An edition
    /// the source does not have is forgotten once every concurrent caller has
    /// seen the error, so unknown names never accumulate in the cache.
    pub fn load(&self, edition: &str) -> Result<Arc<RuleTableSet>, DataError> {
        // The map lock only guards slot lookup; the load itself runs under the slot
        let slot = {
            let mut editions = self.editions.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(editions.entry(edition.to_string()).or_default())
        };

        let loaded = slot.get_or_init(|| self.fetch_and_validate(edition)).clone();
        if let Err(DataError::EditionNotFound(_)) = loaded {
            self.forget(edition, &slot);
        }
        loaded
    }

    /// Remove the slot for an edition if it is still the given one
    fn forget(&self, edition: &str, slot: &Slot) {
        let mut editions = self.editions.lock().unwrap_or_else(PoisonError::into_inner);
        if editions
            .get(edition)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            editions.remove(edition);
        }
    }

    fn fetch_and_validate(&self, edition: &str) -> Result<Arc<RuleTableSet>, DataError> {
        tracing::debug!(edition, "loading rule tables");
        let loaded = self
            .source
            .fetch(edition)
            .and_then(|document| RuleTableSet::from_json(edition, &document));

        match loaded {
            Ok(tables) => {
                tracing::info!(
                    edition,
                    occupancies = tables.occupancies().count(),
                    "rule tables loaded"
                );
                Ok(Arc::new(tables))
            }
            Err(e) => {
                tracing::error!(edition, error = %e, "rule table load failed");
                Err(e)
            }
        }
    }

    /// Drop a cached edition (loaded or failed); returns whether one was present
    pub fn evict(&self, edition: &str) -> bool {
        let mut editions = self.editions.lock().unwrap_or_else(PoisonError::into_inner);
        editions.remove(edition).is_some()
    }

    /// Editions currently cached with successfully loaded tables
    pub fn cached_editions(&self) -> Vec<String> {
        let editions = self.editions.lock().unwrap_or_else(PoisonError::into_inner);
        let mut loaded: Vec<String> = editions
            .iter()
            .filter(|(_, slot)| matches!(slot.get(), Some(Ok(_))))
            .map(|(edition, _)| edition.clone())
            .collect();
        loaded.sort();
        loaded
    }
}
