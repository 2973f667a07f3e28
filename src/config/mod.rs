mod server;

pub use server::{AuthConfig, OpenIdConfig, OpenIdProviderConfig, ServerConfig, ServiceConfig};
