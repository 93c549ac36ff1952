use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, Uri},
};
use axum_extra::extract::CookieJar;

use aquadesk_config::auth::{ACCESS_TOKEN_COOKIE, TRUSTED_HEADER, USER_ID_PARAM};

/// The raw credentials a request carries, one per resolution strategy.
///
/// Values are kept exactly as received; empty values are treated as absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    /// Raw bytes of the `X-User-Data` header.
    pub trusted_header: Option<Vec<u8>>,
    /// Value of the `accessToken` cookie.
    pub access_token: Option<String>,
    /// Value of the `userId` query parameter.
    pub user_id: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl RequestCredentials {
    pub fn from_headers_and_uri(headers: &HeaderMap, uri: &Uri) -> Self {
        let trusted_header = headers
            .get(TRUSTED_HEADER)
            .map(|value| value.as_bytes().to_vec())
            .filter(|bytes| !bytes.iter().all(u8::is_ascii_whitespace));

        let access_token = CookieJar::from_headers(headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .and_then(non_empty);

        // An unparseable query string carries no identifier.
        let user_id = Query::<HashMap<String, String>>::try_from_uri(uri)
            .ok()
            .and_then(|Query(mut params)| params.remove(USER_ID_PARAM))
            .and_then(non_empty);

        Self {
            trusted_header,
            access_token,
            user_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trusted_header.is_none() && self.access_token.is_none() && self.user_id.is_none()
    }
}

// Never print credential values.
impl std::fmt::Debug for RequestCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCredentials")
            .field("trusted_header", &self.trusted_header.is_some())
            .field("access_token", &self.access_token.is_some())
            .field("user_id", &self.user_id.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    fn extract(headers: &[(&str, &str)], uri: &str) -> RequestCredentials {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        RequestCredentials::from_headers_and_uri(&map, &uri.parse().unwrap())
    }

    #[test]
    fn test_extracts_all_carriers() {
        let creds = extract(
            &[
                ("x-user-data", r#"{"id":"u1"}"#),
                ("cookie", "theme=dark; accessToken=abc.def.ghi; refreshToken=zzz"),
            ],
            "/api/session/me?userId=u1&page=2",
        );

        assert_eq!(creds.trusted_header.as_deref(), Some(br#"{"id":"u1"}"#.as_slice()));
        assert_eq!(creds.access_token.as_deref(), Some("abc.def.ghi"));
        assert_eq!(creds.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_user_id_ignores_other_params() {
        let creds = extract(&[], &format!("/?page=2&{USER_ID_PARAM}=u7&userid=u8"));
        assert_eq!(creds.user_id.as_deref(), Some("u7"));

        let creds = extract(&[], "/?user_id=u7&UserId=u8");
        assert!(creds.user_id.is_none());
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let creds = extract(&[("X-User-Data", "{}")], "/");
        assert!(creds.trusted_header.is_some());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let creds = extract(
            &[("x-user-data", "  "), ("cookie", "accessToken=")],
            "/?userId=",
        );
        assert!(creds.is_empty());
    }

    #[test]
    fn test_nothing_present() {
        let creds = extract(&[], "/api/session/me");
        assert_eq!(creds, RequestCredentials::default());
    }

    #[test]
    fn test_refresh_cookie_is_not_an_access_token() {
        let creds = extract(&[("cookie", "refreshToken=abc")], "/");
        assert!(creds.access_token.is_none());
    }

    #[test]
    fn test_debug_hides_values() {
        let creds = extract(&[("cookie", "accessToken=secret-token")], "/?userId=u1");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("u1"));
    }
}
