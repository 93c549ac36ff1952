//! # AquaDesk Models
//!
//! Domain models read by the AquaDesk authentication layer.
//!
//! - [`ids`]: Strongly-typed UUID newtypes
//! - [`roles`]: Roles, privileges and their assignment rows
//! - [`users`]: User identity rows

pub mod ids;
pub mod roles;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use ids::{PrivilegeId, RoleId, UserId};
pub use roles::{Privilege, Role, RolePrivilege, UserRole};
pub use users::User;
