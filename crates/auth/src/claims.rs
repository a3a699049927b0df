use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::token::TokenRejection;

/// Token payload as it comes out of signature verification, before any
/// claim is checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClaims {
    #[serde(default)]
    pub exp: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Verified token claims.
///
/// `exp` is the only claim this toolkit requires. `sub` and `iat` are lifted
/// out when they have the expected type; everything else is kept as-is in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration, unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,

    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Issue time, unix seconds.
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new(expires_at: i64) -> Self {
        Self {
            expires_at,
            subject: None,
            issued_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn issued(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at.timestamp());
        self
    }

    pub fn expiring_at(expires_at: DateTime<Utc>) -> Self {
        Self::new(expires_at.timestamp())
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// A token is expired once the clock is strictly past `exp`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.expires_at
    }
}

impl TryFrom<RawClaims> for Claims {
    type Error = TokenRejection;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let expires_at = match raw.exp {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or(TokenRejection::InvalidClaims)?,
            _ => return Err(TokenRejection::InvalidClaims),
        };

        let mut extra = raw.extra;
        let subject = take(&mut extra, "sub", |v| v.as_str().map(str::to_owned));
        let issued_at = take(&mut extra, "iat", Value::as_i64);

        Ok(Self {
            expires_at,
            subject,
            issued_at,
            extra,
        })
    }
}

/// Remove `key` from `extra` only if `parse` accepts its value.
fn take<T>(extra: &mut Map<String, Value>, key: &str, parse: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let parsed = extra.get(key).and_then(parse)?;
    extra.remove(key);
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn raw(payload: Value) -> RawClaims {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn integer_exp_is_accepted() {
        let claims = Claims::try_from(raw(json!({ "exp": 1_700_000_000, "sub": "alice" }))).unwrap();

        assert_eq!(claims.expires_at, 1_700_000_000);
        assert_eq!(claims.subject(), Some("alice"));
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn registered_claims_are_typed_and_the_rest_kept() {
        let claims = Claims::try_from(raw(json!({
            "exp": 1_700_000_600,
            "iat": 1_700_000_000,
            "sub": "alice",
            "role": "admin",
        })))
        .unwrap();

        assert_eq!(claims.subject.as_deref(), Some("alice"));
        assert_eq!(claims.issued_at, Some(1_700_000_000));
        assert_eq!(claims.extra, json!({ "role": "admin" }).as_object().unwrap().clone());
    }

    #[test]
    fn mistyped_optional_claims_stay_in_extra() {
        let claims = Claims::try_from(raw(json!({ "exp": 1, "sub": 7, "iat": "yesterday" }))).unwrap();

        assert_eq!(claims.subject, None);
        assert_eq!(claims.issued_at, None);
        assert_eq!(claims.extra["sub"], json!(7));
        assert_eq!(claims.extra["iat"], json!("yesterday"));
    }

    #[test]
    fn float_exp_is_truncated() {
        let claims = Claims::try_from(raw(json!({ "exp": 1_700_000_000.9 }))).unwrap();
        assert_eq!(claims.expires_at, 1_700_000_000);
    }

    #[test]
    fn missing_exp_is_rejected() {
        let err = Claims::try_from(raw(json!({ "sub": "alice" }))).unwrap_err();
        assert_eq!(err, TokenRejection::InvalidClaims);
    }

    #[test]
    fn string_exp_is_rejected() {
        let err = Claims::try_from(raw(json!({ "exp": "tomorrow" }))).unwrap_err();
        assert_eq!(err, TokenRejection::InvalidClaims);
    }

    #[test]
    fn expiry_is_strictly_after_exp() {
        let exp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = Claims::expiring_at(exp);

        assert!(!claims.is_expired(exp));
        assert!(claims.is_expired(exp + chrono::Duration::seconds(1)));
    }

    #[test]
    fn serializes_exp_alongside_extra_claims() {
        let issued = Utc.timestamp_opt(40, 0).unwrap();
        let claims = Claims::new(42)
            .with_subject("bob")
            .issued(issued)
            .with_claim("tenant", "acme");
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value, json!({ "exp": 42, "sub": "bob", "iat": 40, "tenant": "acme" }));
        assert_eq!(serde_json::from_value::<Claims>(value).unwrap(), claims);
    }
}
