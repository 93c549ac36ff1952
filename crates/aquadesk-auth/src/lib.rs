//! # AquaDesk Auth
//!
//! Identity types and credential codecs for the AquaDesk API.
//!
//! - [`principal`]: The resolved caller of a request
//! - [`claims`]: Access and refresh token claims
//! - [`codec`]: Token signing and typed verification
//! - [`header`]: Parsing of the gateway's `X-User-Data` identity header
//!
//! Nothing in this crate performs I/O; the request-level resolution that ties
//! these pieces to the principal store lives in the `aquadesk` crate.

pub mod claims;
pub mod codec;
pub mod header;
pub mod principal;

// Re-export commonly used types at crate root
pub use claims::{AccessClaims, RefreshClaims, TokenKind};
pub use codec::{IssuedToken, TokenCodec, VerificationFailure};
pub use header::{InvalidHeader, TrustedIdentity, parse_trusted_header};
pub use principal::Principal;
