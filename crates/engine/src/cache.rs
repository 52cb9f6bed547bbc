//! Response cache for interactive report pages.
//!
//! Keys are derived from the full request shape, so any change to
//! filters, sort, or pagination misses. Cache failures never fail a
//! report; the generator logs and recomputes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};

use stocklens_core::{EnvelopeBody, FilterValues, SortSpec};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

pub trait ReportCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<EnvelopeBody>, CacheError>;
    fn set(&self, key: &str, body: &EnvelopeBody, ttl: Duration) -> Result<(), CacheError>;
    fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Disables caching; every request recomputes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ReportCache for NoopCache {
    fn get(&self, _key: &str) -> Result<Option<EnvelopeBody>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _body: &EnvelopeBody, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn invalidate(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (EnvelopeBody, Instant)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportCache for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<EnvelopeBody>, CacheError> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((body, expires)) if *expires > Instant::now() => Ok(Some(body.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, body: &EnvelopeBody, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), (body.clone(), Instant::now() + ttl));
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
        Ok(())
    }
}

#[derive(Serialize)]
struct KeyInput<'a> {
    filters: &'a FilterValues,
    sort: Option<&'a SortSpec>,
    page: usize,
    page_size: usize,
}

/// Report id prefix keeps keys inspectable and namespaced per report.
pub fn cache_key(
    report_id: &str,
    filters: &FilterValues,
    sort: Option<&SortSpec>,
    page: usize,
    page_size: usize,
) -> String {
    let input = KeyInput {
        filters,
        sort,
        page,
        page_size,
    };
    // FilterValues is a BTreeMap, so serialization is canonical.
    let serialized = serde_json::to_vec(&input).expect("cache key input is serializable");
    let mut hasher = Sha256::new();
    hasher.update(&serialized);
    format!("{report_id}:{:x}", hasher.finalize())
}
