//! `stocklens-engine` — report execution: the generator, the store
//! boundary, response caching, and the in-memory reference store.

pub mod cache;
pub mod config;
pub mod generator;
pub mod memory;
pub mod store;

pub use cache::{cache_key, CacheError, InMemoryCache, NoopCache, ReportCache};
pub use config::EngineConfig;
pub use generator::ReportGenerator;
pub use memory::InMemoryStore;
pub use store::{DocumentStore, StoreError};
