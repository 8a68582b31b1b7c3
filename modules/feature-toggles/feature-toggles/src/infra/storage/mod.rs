//! Storage implementations for the feature-toggles module.

mod in_memory_store;

pub use in_memory_store::InMemoryFeatureStore;
