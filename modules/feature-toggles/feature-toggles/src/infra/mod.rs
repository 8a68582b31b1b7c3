//! Infrastructure implementations of the domain contracts.

pub mod cache;
pub mod security;
pub mod storage;

pub use cache::InMemoryFeatureCache;
pub use security::StaticAuthorizationManager;
pub use storage::InMemoryFeatureStore;
