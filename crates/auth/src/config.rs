use core::fmt;

use httpkit_core::ConfigError;

/// Environment variable holding the shared HMAC secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Authentication configuration, built once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    secret: Vec<u8>,
}

impl AuthConfig {
    /// Build from an explicit secret. An empty secret is a configuration error.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::missing(JWT_SECRET_ENV));
        }
        Ok(Self { secret })
    }

    /// Read the secret from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the secret through an arbitrary key lookup (used by tests and by
    /// callers with their own configuration source).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::missing(JWT_SECRET_ENV))?;
        Self::new(secret.into_bytes())
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

// Never print the secret.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}
