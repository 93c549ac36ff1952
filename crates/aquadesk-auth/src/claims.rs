//! JWT claim structures for AquaDesk tokens.
//!
//! - [`AccessClaims`]: short-lived token carrying a full principal snapshot
//! - [`RefreshClaims`]: long-lived token used only to mint new access tokens
//!
//! Claims are serialized in camelCase to match what the front-end decodes.
//! Both carry a `typ` marker so one kind of token can never be accepted as the
//! other.

use serde::{Deserialize, Serialize};

use crate::principal::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Access token claims.
///
/// Embeds the identity together with roles and privileges, so requests
/// authenticated by this token need no database lookup. The snapshot can go
/// stale until the token expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub is_temporary_password: bool,
    pub roles: Vec<String>,
    pub privileges: Vec<String>,
    pub typ: TokenKind,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Refresh token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: String,
    pub email: String,
    pub typ: TokenKind,
    /// Unique token identifier so two refresh tokens are never identical
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn for_principal(principal: &Principal, iat: i64, exp: i64) -> Self {
        Self {
            user_id: principal.user_id.clone(),
            email: principal.email.clone(),
            full_name: principal.full_name.clone(),
            is_temporary_password: principal.is_temporary_password,
            roles: principal.roles.iter().cloned().collect(),
            privileges: principal.privileges.iter().cloned().collect(),
            typ: TokenKind::Access,
            iat,
            exp,
        }
    }

    /// Takes every identity field verbatim from the token.
    pub fn into_principal(self) -> Principal {
        Principal {
            user_id: self.user_id,
            email: self.email,
            full_name: self.full_name,
            is_temporary_password: self.is_temporary_password,
            roles: self.roles.into_iter().collect(),
            privileges: self.privileges.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sample_principal() -> Principal {
        Principal {
            user_id: "u1".to_string(),
            email: "a@x.com".to_string(),
            full_name: "A".to_string(),
            is_temporary_password: true,
            roles: BTreeSet::from(["support_agent".to_string()]),
            privileges: BTreeSet::from(["assign_tickets".to_string(), "view_tickets".to_string()]),
        }
    }

    #[test]
    fn test_access_claims_wire_names() {
        let claims = AccessClaims::for_principal(&sample_principal(), 100, 1000);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["isTemporaryPassword"], true);
        assert_eq!(json["fullName"], "A");
        assert_eq!(json["typ"], "access");
        assert_eq!(json["exp"], 1000);
        assert_eq!(json["iat"], 100);
    }

    #[test]
    fn test_principal_survives_claims() {
        let principal = sample_principal();
        let back = AccessClaims::for_principal(&principal, 0, 1).into_principal();
        assert_eq!(back, principal);
    }

    #[test]
    fn test_duplicate_claims_collapse_into_sets() {
        let json = r#"{"userId":"u1","email":"a@x.com","fullName":"A","isTemporaryPassword":false,"roles":["r","r"],"privileges":["p","p","q"],"typ":"access","iat":1,"exp":2}"#;
        let claims: AccessClaims = serde_json::from_str(json).unwrap();
        let principal = claims.into_principal();

        assert_eq!(principal.roles.len(), 1);
        assert_eq!(principal.privileges.len(), 2);
    }

    #[test]
    fn test_refresh_claims_serialize() {
        let claims = RefreshClaims {
            user_id: "u1".to_string(),
            email: "a@x.com".to_string(),
            typ: TokenKind::Refresh,
            jti: "jti-1".to_string(),
            iat: 1,
            exp: 2,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""typ":"refresh""#));
        assert!(serialized.contains(r#""jti":"jti-1""#));
    }
}
