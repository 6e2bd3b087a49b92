use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use chrono::{Duration, Utc};
use common_auth::{ConfigError, JwtConfig, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_PORT: u16 = 8080;

#[derive(Clone)]
pub struct ApiConfig {
    pub jwt: JwtConfig,
    pub login_username: String,
    pub login_password: String,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("jwt", &self.jwt)
            .field("login_username", &self.login_username)
            .field("login_password", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl ApiConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST '{}'", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

pub fn load_api_config() -> Result<ApiConfig> {
    load_api_config_from(|key| env::var(key).ok())
}

/// Build the configuration from an arbitrary key lookup.
pub fn load_api_config_from<F>(lookup: F) -> Result<ApiConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let key = lookup("JWT_KEY").unwrap_or_default();
    let issuer = lookup("JWT_ISSUER").unwrap_or_default();
    let audience = lookup("JWT_AUDIENCE").unwrap_or_default();

    let mut jwt = JwtConfig::new(key, issuer, audience)?;

    if let Some(minutes) = lookup("JWT_TTL_MINUTES").and_then(|v| normalize_optional(&v)) {
        // Tokens minted now must still carry a representable expiry.
        let ttl = minutes
            .parse::<i64>()
            .ok()
            .filter(|value| *value > 0)
            .and_then(Duration::try_minutes)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| ConfigError::Invalid("JWT_TTL_MINUTES", minutes.clone()))?;
        jwt = jwt.with_token_ttl(ttl);
    }

    if let Some(seconds) = lookup("JWT_LEEWAY_SECONDS").and_then(|v| normalize_optional(&v)) {
        let seconds: u32 = seconds
            .parse()
            .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS", seconds.clone()))?;
        jwt = jwt.with_leeway(seconds);
    }

    let login_username = lookup("AUTH_USERNAME")
        .and_then(|v| normalize_optional(&v))
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
    let login_password = lookup("AUTH_PASSWORD")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

    let database_url = lookup("DATABASE_URL").and_then(|v| normalize_optional(&v));

    let host = lookup("HOST")
        .and_then(|v| normalize_optional(&v))
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = match lookup("PORT").and_then(|v| normalize_optional(&v)) {
        Some(value) => value
            .parse()
            .map_err(|err| anyhow!("Invalid PORT '{value}': {err}"))?,
        None => DEFAULT_PORT,
    };

    let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
        .map(|value| parse_list(&value))
        .unwrap_or_else(default_origins);
    if let Some(origin) = allowed_origins
        .iter()
        .find(|origin| *origin == "*" || HeaderValue::from_str(origin).is_err())
    {
        return Err(ConfigError::Invalid("CORS_ALLOWED_ORIGINS", origin.clone()).into());
    }

    Ok(ApiConfig {
        jwt,
        login_username,
        login_password,
        database_url,
        host,
        port,
        allowed_origins,
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(normalize_optional)
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("JWT_KEY", "config-test-secret"),
        ("JWT_ISSUER", "test-issuer"),
        ("JWT_AUDIENCE", "test-audience"),
    ];

    #[test]
    fn loads_defaults_with_required_values() {
        let config = load_api_config_from(lookup_from(REQUIRED)).expect("config");
        assert_eq!(config.jwt.issuer, "test-issuer");
        assert_eq!(config.jwt.audience, "test-audience");
        assert_eq!(config.jwt.token_ttl, Duration::minutes(30));
        assert_eq!(config.login_username, "testuser");
        assert_eq!(config.login_password, "password");
        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
        assert_eq!(
            config.socket_addr().expect("addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn missing_jwt_settings_fail_with_config_error() {
        for missing in ["JWT_KEY", "JWT_ISSUER", "JWT_AUDIENCE"] {
            let pairs: Vec<(&str, &str)> = REQUIRED
                .iter()
                .copied()
                .filter(|(key, _)| *key != missing)
                .collect();
            let err = load_api_config_from(lookup_from(&pairs)).expect_err("must fail");
            let config_err = err.downcast_ref::<ConfigError>().expect("config error");
            assert!(matches!(config_err, ConfigError::Missing(_)));
            assert!(err.to_string().contains("must be configured"));
        }
    }

    #[test]
    fn empty_jwt_key_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("JWT_KEY", "");
        let err = load_api_config_from(lookup_from(&pairs)).expect_err("must fail");
        assert_eq!(err.to_string(), "JWT key must be configured.");
    }

    #[test]
    fn optional_overrides_are_applied() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("JWT_TTL_MINUTES", "5"),
            ("JWT_LEEWAY_SECONDS", "10"),
            ("DATABASE_URL", "mysql://app:pw@localhost:3306/app"),
            ("PORT", "9000"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ]);
        let config = load_api_config_from(lookup_from(&pairs)).expect("config");
        assert_eq!(config.jwt.token_ttl, Duration::minutes(5));
        assert_eq!(config.jwt.leeway_seconds, 10);
        assert_eq!(
            config.database_url.as_deref(),
            Some("mysql://app:pw@localhost:3306/app")
        );
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        for value in ["-3", "0", "soon", "9223372036854775807", "1000000000000"] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(("JWT_TTL_MINUTES", value));
            let err = load_api_config_from(lookup_from(&pairs)).expect_err(value);
            assert!(
                matches!(
                    err.downcast_ref::<ConfigError>(),
                    Some(ConfigError::Invalid("JWT_TTL_MINUTES", _))
                ),
                "{value}: {err}"
            );
        }
    }

    #[test]
    fn unusable_cors_origins_are_rejected() {
        for (value, rejected) in [
            ("https://ok.example,https://bad\u{7f}.example", "https://bad\u{7f}.example"),
            ("https://ok.example *", "*"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(("CORS_ALLOWED_ORIGINS", value));
            let err = load_api_config_from(lookup_from(&pairs)).expect_err("must fail");
            assert_eq!(
                err.downcast_ref::<ConfigError>(),
                Some(&ConfigError::Invalid("CORS_ALLOWED_ORIGINS", rejected.to_string()))
            );
        }
    }
}
