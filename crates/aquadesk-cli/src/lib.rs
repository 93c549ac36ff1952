//! # AquaDesk CLI
//!
//! Database seeding utilities for AquaDesk development and testing.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use aquadesk_cli::seeder::{seed_roles, seed_users};
//!
//! seed_roles(&pool).await?;
//! seed_users(&pool, 50).await?;
//! ```

pub mod seeder;
