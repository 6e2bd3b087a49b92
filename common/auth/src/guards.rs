use std::collections::HashSet;

use tracing::warn;

use crate::claims::Identity;
use crate::error::AuthError;
use crate::AuthContext;

/// Decides whether an authenticated identity may reach a protected route.
pub trait AuthorizationPolicy: Send + Sync {
    fn authorize(&self, identity: &Identity) -> bool;
}

/// Any verified identity is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAuthenticated;

impl AuthorizationPolicy for AllowAuthenticated {
    fn authorize(&self, _identity: &Identity) -> bool {
        true
    }
}

/// Only identities whose name is in the allow-list are admitted.
#[derive(Debug, Clone, Default)]
pub struct AllowNames {
    names: HashSet<String>,
}

impl AllowNames {
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl AuthorizationPolicy for AllowNames {
    fn authorize(&self, identity: &Identity) -> bool {
        self.names.contains(&identity.name)
    }
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&Identity) -> bool + Send + Sync,
{
    fn authorize(&self, identity: &Identity) -> bool {
        self(identity)
    }
}

pub fn ensure_authorized(
    auth: &AuthContext,
    policy: &dyn AuthorizationPolicy,
) -> Result<(), AuthError> {
    if policy.authorize(&auth.identity) {
        Ok(())
    } else {
        warn!(identity = %auth.identity.name, "authorization policy denied request");
        Err(AuthError::Forbidden)
    }
}
