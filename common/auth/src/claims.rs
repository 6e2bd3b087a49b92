use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Claim carrying the identity name, as written by common JWT handlers
/// for the "name" claim type.
pub const NAME_CLAIM: &str = "unique_name";

/// Wire representation of the claims minted by the issuer.
#[derive(Debug, Serialize)]
pub(crate) struct TokenClaims<'a> {
    pub unique_name: &'a str,
    pub exp: i64,
    pub iss: &'a str,
    pub aud: &'a str,
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub name: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default)]
    unique_name: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<AudienceRepr>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AudienceRepr {
    Single(String),
    Many(Vec<String>),
}

impl TryFrom<ClaimsRepr> for Identity {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let name = value
            .unique_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AuthError::InvalidClaim(NAME_CLAIM, "missing".into()))?;

        let exp = value
            .exp
            .ok_or_else(|| AuthError::InvalidClaim("exp", "missing".into()))?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", exp.to_string()))?;

        let audience = match value.aud {
            Some(AudienceRepr::Single(item)) => vec![item],
            Some(AudienceRepr::Many(items)) => items,
            None => Vec::new(),
        };

        Ok(Self {
            name,
            issuer: value.iss.unwrap_or_default(),
            audience,
            expires_at,
            raw: serde_json::Value::Null,
        })
    }
}

impl TryFrom<serde_json::Value> for Identity {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| AuthError::Malformed(format!("claims: {err}")))?;
        let mut identity = Identity::try_from(repr)?;
        identity.raw = value;
        Ok(identity)
    }
}
