//! # AquaDesk Config
//!
//! Configuration types for the AquaDesk API, loaded from environment variables:
//!
//! - [`auth`]: Credential transport names and resolution settings
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: PostgreSQL connection settings
//! - [`jwt`]: Token signing configuration
//!
//! # Example
//!
//! ```ignore
//! use aquadesk_config::{AuthConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let auth_config = AuthConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod database;
pub mod jwt;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
