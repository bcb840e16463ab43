pub mod discovery;
pub mod models;

pub use discovery::{DiscoveryClient, DiscoveryError};
pub use models::{AccessTokenResponse, OpenIdConfig};

pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
