//! Lookup of users with their roles and privileges.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryPrincipalStore;
pub use postgres::PgPrincipalStore;
pub use store::{PrincipalRecord, PrincipalStore, StoreError};
