use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unsupported token algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token issuer mismatch")]
    IssuerMismatch,
    #[error("token audience mismatch")]
    AudienceMismatch,
    #[error("token expired")]
    Expired,
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("access denied by authorization policy")]
    Forbidden,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// True for every failure produced while checking a presented token.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthorization
                | AuthError::InvalidAuthorization
                | AuthError::Malformed(_)
                | AuthError::UnsupportedAlgorithm(_)
                | AuthError::BadSignature
                | AuthError::IssuerMismatch
                | AuthError::AudienceMismatch
                | AuthError::Expired
                | AuthError::InvalidClaim(_, _)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match value.kind() {
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
            ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm("unknown".into()),
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "iss" => AuthError::IssuerMismatch,
                "aud" => AuthError::AudienceMismatch,
                "exp" => AuthError::InvalidClaim("exp", "missing".into()),
                other => AuthError::Malformed(format!("missing claim '{other}'")),
            },
            _ => AuthError::Malformed(value.to_string()),
        }
    }
}

// Responses carry no body: callers must not learn which check failed.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };

        let mut response = status.into_response();
        if self.is_rejection() {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Startup failure for missing or unusable JWT settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT {0} must be configured.")]
    Missing(&'static str),
    #[error("invalid value '{1}' for {0}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn rejections_render_empty_unauthorized() {
        for err in [
            AuthError::BadSignature,
            AuthError::Expired,
            AuthError::IssuerMismatch,
            AuthError::AudienceMismatch,
            AuthError::MissingAuthorization,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert!(body.is_empty());
        }
    }

    #[test]
    fn invalid_credentials_is_unauthorized_without_challenge() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn forbidden_and_signing_statuses() {
        assert_eq!(
            AuthError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::Signing("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn jsonwebtoken_errors_map_to_rejections() {
        use jsonwebtoken::errors::{Error, ErrorKind};

        let cases = [
            (ErrorKind::InvalidSignature, "token signature mismatch"),
            (ErrorKind::InvalidIssuer, "token issuer mismatch"),
            (ErrorKind::InvalidAudience, "token audience mismatch"),
            (ErrorKind::ExpiredSignature, "token expired"),
        ];
        for (kind, message) in cases {
            let err = AuthError::from(Error::from(kind));
            assert!(err.is_rejection(), "{err:?}");
            assert_eq!(err.to_string(), message);
        }

        let malformed = AuthError::from(Error::from(ErrorKind::InvalidToken));
        assert!(matches!(malformed, AuthError::Malformed(_)));

        let missing = AuthError::from(Error::from(ErrorKind::MissingRequiredClaim(
            "exp".to_string(),
        )));
        assert!(matches!(missing, AuthError::InvalidClaim("exp", _)));
    }

    #[test]
    fn config_error_message_names_setting() {
        assert_eq!(
            ConfigError::Missing("issuer").to_string(),
            "JWT issuer must be configured."
        );
    }
}
