pub mod auth;
pub mod connectors;
pub mod ledgers;
pub mod oauth_clients;
pub mod overview;
pub mod webhooks;
