/// Authentication core
///
/// Credential verification, access-token issuance, and refresh-token
/// lifecycle management.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::Claims;
pub use jwt::decode_access_token;
pub use jwt::issue_access_token;
pub use password::BcryptHasher;
pub use password::SlowHasher;
pub use refresh_token::generate_refresh_token;
pub use service::AuthService;
pub use service::TokenPair;
