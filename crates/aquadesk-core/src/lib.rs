//! # AquaDesk Core
//!
//! Core types shared by every AquaDesk crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`privileges`]: Privilege and standard role name constants
//!
//! # Example
//!
//! ```ignore
//! use aquadesk_core::AppError;
//!
//! let error = AppError::unauthorized("No usable credential");
//! ```

pub mod errors;
pub mod privileges;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorBody};
