//! Seeding of roles, privileges and fake users.

pub mod models;
pub mod roles;
pub mod users;

pub use models::UserSeed;
pub use roles::{SeededRoles, seed_roles};
pub use users::{generate_users, insert_users_batch, seed_users};
