pub mod admin;
pub mod authorization;
pub mod cache;
pub mod cache_proxy;
pub mod error;
pub mod flip;
mod keyed_lock;
pub mod store;
pub mod strategy;
