pub mod api;
pub mod auth;
pub mod core;
pub mod http;
pub mod oidc;
pub mod provider;
pub mod util;
pub mod view;
