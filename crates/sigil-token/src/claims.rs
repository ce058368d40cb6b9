//! Access and refresh token claims.

use crate::error::{TokenError, TokenResult};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Claims carried by a user access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiry as Unix seconds. Zero means the token never declared one.
    #[serde(default)]
    pub exp: i64,

    /// Username.
    #[serde(rename = "usr", default, skip_serializing_if = "String::is_empty")]
    pub username: String,

    /// Group names. The access controller stores the plan name in the first group.
    #[serde(rename = "grp", default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    /// Organization names.
    #[serde(rename = "org", default, skip_serializing_if = "Vec::is_empty")]
    pub orgs: Vec<String>,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(default)]
    pub exp: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
}

impl AccessClaims {
    pub fn new(
        username: impl Into<String>,
        groups: Vec<String>,
        orgs: Vec<String>,
        exp: i64,
    ) -> Self {
        Self {
            exp,
            username: username.into(),
            groups,
            orgs,
        }
    }

    /// First group, if any.
    pub fn first_group(&self) -> Option<&str> {
        self.groups.first().map(String::as_str)
    }
}

impl RefreshClaims {
    pub fn new(namespace: impl Into<String>, username: impl Into<String>, exp: i64) -> Self {
        Self {
            exp,
            namespace: namespace.into(),
            username: username.into(),
        }
    }
}

/// Claims with an expiry timestamp.
pub trait Expiring {
    /// Expiry as Unix seconds, zero when absent.
    fn expires_at(&self) -> i64;

    /// Checks the expiry against the current time.
    fn validate(&self) -> TokenResult<()> {
        self.validate_at(Utc::now().timestamp())
    }

    /// Checks the expiry against `now` (Unix seconds).
    fn validate_at(&self, now: i64) -> TokenResult<()> {
        validate_expiry(self.expires_at(), now)
    }
}

impl Expiring for AccessClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Valid only while `now < exp`. A zero expiry is never valid.
pub fn validate_expiry(exp: i64, now: i64) -> TokenResult<()> {
    if exp == 0 {
        return Err(TokenError::MissingExpiry);
    }
    if now >= exp {
        return Err(TokenError::Expired {
            expired_at: exp,
            now,
        });
    }
    Ok(())
}

/// Decodes a JSON payload. On failure the error carries the payload text.
pub fn decode_claims<T: DeserializeOwned>(payload: &[u8]) -> TokenResult<T> {
    serde_json::from_slice(payload).map_err(|source| TokenError::ClaimsDecode {
        source,
        payload: String::from_utf8_lossy(payload).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let now = 1_700_000_000;
        let claims = AccessClaims::new("jane", vec![], vec![], now);

        assert!(matches!(
            claims.validate_at(now),
            Err(TokenError::Expired { expired_at, .. }) if expired_at == now
        ));
        assert!(matches!(claims.validate_at(now + 1), Err(TokenError::Expired { .. })));
        assert!(claims.validate_at(now - 1).is_ok());
    }

    #[test]
    fn test_zero_expiry_is_never_valid() {
        let claims = RefreshClaims::new("ns", "jane", 0);
        assert!(matches!(claims.validate_at(0), Err(TokenError::MissingExpiry)));
        assert!(matches!(claims.validate_at(-5), Err(TokenError::MissingExpiry)));
    }

    #[test]
    fn test_validate_uses_current_time() {
        let future = AccessClaims::new("jane", vec![], vec![], Utc::now().timestamp() + 60);
        assert!(future.validate().is_ok());

        let past = AccessClaims::new("jane", vec![], vec![], Utc::now().timestamp() - 1);
        assert!(past.validate().is_err());
    }

    #[test]
    fn test_access_claims_json_shape() {
        let claims = AccessClaims::new(
            "jane",
            vec!["FreePlan".into()],
            vec!["acme".into()],
            1_700_000_000,
        );
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"exp":1700000000,"usr":"jane","grp":["FreePlan"],"org":["acme"]}"#);

        let empty = serde_json::to_string(&AccessClaims::new("", vec![], vec![], 42)).unwrap();
        assert_eq!(empty, r#"{"exp":42}"#);
    }

    #[test]
    fn test_missing_fields_default() {
        let claims: AccessClaims = decode_claims(br#"{"usr":"bob"}"#).unwrap();
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.exp, 0);
        assert!(claims.groups.is_empty());
        assert_eq!(claims.first_group(), None);

        let refresh: RefreshClaims =
            decode_claims(br#"{"exp":9,"namespace":"ns","username":"bob"}"#).unwrap();
        assert_eq!(refresh, RefreshClaims::new("ns", "bob", 9));
    }

    #[test]
    fn test_decode_error_carries_payload() {
        let err = decode_claims::<AccessClaims>(b"{not json").unwrap_err();
        match &err {
            TokenError::ClaimsDecode { payload, .. } => assert_eq!(payload, "{not json"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().ends_with("=> cannot JSON-decode claims: {not json"));
    }
}
