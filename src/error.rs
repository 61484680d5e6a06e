/// Error Handling Module
///
/// Unified error taxonomy for the authentication core:
/// 1. Authentication failures (uniform, non-distinguishing)
/// 2. Configuration errors (fatal at startup, never per-request)
/// 3. Store errors (persistence failures, surfaced untranslated)
///
/// The core returns typed failure kinds only; message localization and
/// HTTP status mapping belong to the presentation layer.

use std::error::Error as StdError;
use std::fmt;

/// Authentication failures
///
/// `InvalidCredentials` covers both unknown-username and wrong-password;
/// `InvalidRefreshToken` covers absent, revoked, and expired tokens. The
/// unification is deliberate: callers must not be able to distinguish the
/// underlying cause (username/token enumeration resistance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidRefreshToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
            AuthError::InvalidRefreshToken => write!(f, "invalid or expired refresh token"),
        }
    }
}

impl StdError for AuthError {}

/// Configuration errors
///
/// Raised while loading and validating settings at process startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Persistence errors
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    Conflict(String),
    QueryExecution(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "not found: {}", msg),
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::QueryExecution(msg) => write!(f, "query error: {}", msg),
            StoreError::ConnectionPool(msg) => write!(f, "store connection error: {}", msg),
            StoreError::UnexpectedError(msg) => write!(f, "store error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Central error type all operations of the core map to
#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Config(ConfigError),
    Store(StoreError),
    Internal(String),
}

impl AppError {
    /// The authentication failure kind, if this is one.
    ///
    /// Callers branch on the kind rather than on a message.
    pub fn auth_kind(&self) -> Option<AuthError> {
        match self {
            AppError::Auth(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::MissingRequired(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            StoreError::Conflict(error_msg)
        } else if error_msg.contains("no rows") {
            StoreError::NotFound("record not found".to_string())
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            StoreError::ConnectionPool(error_msg)
        } else {
            StoreError::QueryExecution(error_msg)
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(err.into())
    }
}
