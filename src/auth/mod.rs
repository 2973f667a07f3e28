mod helpers;
mod link_token;
mod middleware;
mod openid;
mod principal;
mod token;

pub use helpers::{
    TokenValidationError, ValidatedCredential, extract_basic_auth_token, extract_token_from_header,
    validate_credential,
};
pub use link_token::{LinkShareClaims, LinkShareTokens};
pub use middleware::{AuthError, RequireAdmin, RequireAuth, RequireUser};
pub use openid::{Provider, ProviderCache};
pub use principal::{Auth, LinkShareAuth};
pub use token::{TokenGenerator, issue_token, parse_token, random_alphanumeric};
