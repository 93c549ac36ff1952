//! Request authentication.
//!
//! - [`credentials`]: Extraction of the raw credentials a request carries
//! - [`resolver`]: Ordered resolution of credentials into a principal
//! - [`auth`]: `require_auth` / `optional_auth` middleware and extractors
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{CurrentPrincipal, RequireAssignTickets};
//!
//! // Any authenticated caller
//! async fn profile(CurrentPrincipal(principal): CurrentPrincipal) -> impl IntoResponse {
//!     // ...
//! }
//!
//! // Only callers holding `assign_tickets`
//! async fn reassign(RequireAssignTickets(principal): RequireAssignTickets) -> impl IntoResponse {
//!     // ...
//! }
//! ```

pub mod auth;
pub mod credentials;
pub mod resolver;
