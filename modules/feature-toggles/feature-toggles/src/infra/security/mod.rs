//! Authorization manager implementations.

mod static_authz;

pub use static_authz::StaticAuthorizationManager;
