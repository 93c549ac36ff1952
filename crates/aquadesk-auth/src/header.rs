//! Parsing of the identity header injected by the trusted API gateway.
//!
//! The gateway forwards the logged-in user as JSON in `X-User-Data`:
//!
//! ```text
//! {"id":"u1","email":"a@x.com","is_temporary_password":false,"full_name":"A","roles":[{"name":"support_agent"}]}
//! ```
//!
//! The payload names roles only. Principals built from it never carry
//! privileges, so privilege checks fail for callers authenticated this way.

use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;

use crate::principal::Principal;

/// Why a trusted header could not be used.
#[derive(Debug, Error)]
pub enum InvalidHeader {
    #[error("identity header is empty")]
    Empty,
    #[error("identity header is not valid UTF-8")]
    NotUtf8,
    #[error("malformed identity payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("identity payload has an empty id")]
    MissingId,
}

impl InvalidHeader {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidHeader::Empty => "empty",
            InvalidHeader::NotUtf8 => "not_utf8",
            InvalidHeader::Malformed(_) => "malformed",
            InvalidHeader::MissingId => "missing_id",
        }
    }
}

/// Identity as forwarded by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct TrustedIdentity {
    pub id: OpaqueId,
    pub email: String,
    pub is_temporary_password: bool,
    pub full_name: String,
    pub roles: Vec<RoleRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleRef {
    pub name: String,
}

/// The gateway sends ids either as strings or as bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OpaqueId {
    Text(String),
    Number(i64),
}

impl OpaqueId {
    fn into_string(self) -> String {
        match self {
            OpaqueId::Text(s) => s,
            OpaqueId::Number(n) => n.to_string(),
        }
    }
}

/// Parses the raw header bytes into a [`TrustedIdentity`].
pub fn parse_trusted_header(raw: &[u8]) -> Result<TrustedIdentity, InvalidHeader> {
    let text = std::str::from_utf8(raw).map_err(|_| InvalidHeader::NotUtf8)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(InvalidHeader::Empty);
    }

    let identity: TrustedIdentity = serde_json::from_str(text)?;
    let has_id = match &identity.id {
        OpaqueId::Text(s) => !s.trim().is_empty(),
        OpaqueId::Number(_) => true,
    };
    if !has_id {
        return Err(InvalidHeader::MissingId);
    }

    Ok(identity)
}

impl TrustedIdentity {
    /// Builds the principal for this identity. The privilege set is always
    /// empty: the header does not carry privileges and none are looked up.
    pub fn into_principal(self) -> Principal {
        let roles: BTreeSet<String> = self.roles.into_iter().map(|r| r.name).collect();

        Principal {
            user_id: self.id.into_string(),
            email: self.email,
            full_name: self.full_name,
            is_temporary_password: self.is_temporary_password,
            roles,
            privileges: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"id":"u1","email":"a@x.com","is_temporary_password":false,"full_name":"A","roles":[{"name":"support_agent"}]}"#;

    #[test]
    fn test_parse_valid_header() {
        let principal = parse_trusted_header(VALID.as_bytes())
            .unwrap()
            .into_principal();

        assert_eq!(principal.user_id, "u1");
        assert_eq!(principal.email, "a@x.com");
        assert_eq!(principal.full_name, "A");
        assert!(!principal.is_temporary_password);
        assert!(principal.has_role("support_agent"));
        assert!(principal.privileges.is_empty());
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let raw = r#"{"id":42,"email":"a@x.com","is_temporary_password":true,"full_name":"A","roles":[]}"#;
        let principal = parse_trusted_header(raw.as_bytes())
            .unwrap()
            .into_principal();

        assert_eq!(principal.user_id, "42");
        assert!(principal.is_temporary_password);
        assert!(principal.roles.is_empty());
    }

    #[test]
    fn test_duplicate_roles_collapse() {
        let raw = r#"{"id":"u1","email":"a@x.com","is_temporary_password":false,"full_name":"A","roles":[{"name":"admin"},{"name":"admin"}]}"#;
        let principal = parse_trusted_header(raw.as_bytes())
            .unwrap()
            .into_principal();
        assert_eq!(principal.roles.len(), 1);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_trusted_header(b"{not json").unwrap_err();
        assert!(matches!(err, InvalidHeader::Malformed(_)));
        assert_eq!(err.reason(), "malformed");
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let raw = r#"{"id":"u1","email":"a@x.com","full_name":"A","roles":[]}"#;
        assert!(matches!(
            parse_trusted_header(raw.as_bytes()),
            Err(InvalidHeader::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_header() {
        assert!(matches!(
            parse_trusted_header(b"   "),
            Err(InvalidHeader::Empty)
        ));
    }

    #[test]
    fn test_blank_id() {
        let raw = r#"{"id":" ","email":"a@x.com","is_temporary_password":false,"full_name":"A","roles":[]}"#;
        assert!(matches!(
            parse_trusted_header(raw.as_bytes()),
            Err(InvalidHeader::MissingId)
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            parse_trusted_header(&[0xff, 0xfe, 0x7b]),
            Err(InvalidHeader::NotUtf8)
        ));
    }
}
