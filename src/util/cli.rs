use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{event, Level};

use crate::api::Endpoints;
use crate::auth::error::StateError;
use crate::auth::refresh::{HttpRefreshTransport, RefreshHandle};
use crate::auth::State;
use crate::core::types::{ClientId, ClientSecret, RedirectUri, Scope};
use crate::http::server::Server;
use crate::http::Context;
use crate::provider::{Console, Settings, DEFAULT_SCOPE};
use crate::view::{routes, Renderer, ViewError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not load templates: {0}")]
    View(#[from] ViewError),
    #[error(transparent)]
    State(#[from] StateError),
}

#[derive(Parser)]
#[clap(
    name = "ledger-consoled",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS")
)]
pub struct ServerOptions {
    #[clap(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
    #[clap(long, env = "CLIENT_ID")]
    client_id: ClientId,
    #[clap(long, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
    /// Public origin of the console.
    #[clap(long, env = "REDIRECT_URI")]
    redirect_uri: RedirectUri,
    /// Issuer whose discovery document is served under /.well-known.
    #[clap(long, env = "OPENID_CONFIG_URL")]
    openid_config_url: String,
    #[clap(long, env = "API_URL")]
    api_url: String,
    #[clap(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
    encryption_key: String,
    #[clap(long, env = "SECURE_COOKIES", default_value = "true", parse(try_from_str))]
    secure_cookies: bool,
    #[clap(long, env = "DISCOVERY_TTL_SECS", default_value = "300")]
    discovery_ttl_secs: u64,
    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    http_timeout_secs: u64,
}

impl ServerOptions {
    pub fn settings(&self) -> Settings {
        Settings {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone().map(ClientSecret),
            origin: self.redirect_uri.clone(),
            issuer: self.openid_config_url.clone(),
            api: Endpoints::new(&self.api_url),
            scope: Scope::from_delimited_parts(DEFAULT_SCOPE),
            secure_cookies: self.secure_cookies,
            discovery_ttl: Duration::from_secs(self.discovery_ttl_secs),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

pub async fn run_server(opts: ServerOptions) -> Result<(), CliError> {
    let console = Console::new(opts.settings(), &opts.encryption_key)?;
    let renderer = Renderer::new()?;
    let context = Arc::new(Context { console, renderer });

    Server::new(context).serve(opts.listen).await;
    Ok(())
}

#[derive(Parser)]
#[clap(
    name = "console-util",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS")
)]
pub struct Options {
    #[clap(subcommand)]
    command: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    EncodeState(EncodeState),
    DecodeState(DecodeState),
    Route(Route),
    Keepalive(Keepalive),
}

/// Prints the login `state` for a page.
#[derive(Parser)]
struct EncodeState {
    #[clap(short, long)]
    path: String,
    #[clap(short, long, default_value = "")]
    query: String,
}

#[derive(Parser)]
struct DecodeState {
    state: String,
}

/// Fills the first placeholder of a route template.
#[derive(Parser)]
struct Route {
    template: String,
    #[clap(short, long)]
    id: Option<String>,
}

/// Keeps a console session alive until the console refuses to refresh it.
#[derive(Parser)]
struct Keepalive {
    #[clap(long, env = "REDIRECT_URI")]
    origin: RedirectUri,
    #[clap(long, env = "CONSOLE_SESSION", hide_env_values = true)]
    session: String,
    #[clap(long, env = "HTTP_TIMEOUT_SECS", default_value = "10")]
    http_timeout_secs: u64,
}

fn encode_state(c: &EncodeState) -> Result<(), CliError> {
    println!("{}", State::new(&c.path, &c.query).encode()?);
    Ok(())
}

fn decode_state(c: &DecodeState) -> Result<(), CliError> {
    let state = State::decode(&c.state)?;
    println!("{}", state.redirect_to);
    if state.local_target() != state.redirect_to {
        println!("(not a local path, login would redirect to {})", state.local_target());
    }
    Ok(())
}

fn route(c: &Route) {
    println!("{}", routes::get_route(&c.template, c.id.as_deref()));
}

async fn keepalive(c: &Keepalive) -> Result<(), CliError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(c.http_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;

    let transport = HttpRefreshTransport::new(client, &c.origin, c.session.clone());
    let navigator = transport.navigator();

    let mut handle = RefreshHandle::new();
    handle.start(&c.origin, transport, navigator);
    event!(Level::INFO, origin = %c.origin.0, "Keeping session alive");
    handle.join().await;
    Ok(())
}

pub async fn run_cli_action(opts: Options) -> Result<(), CliError> {
    use SubCommand::*;

    match &opts.command {
        EncodeState(c) => encode_state(c),
        DecodeState(c) => decode_state(c),
        Route(c) => {
            route(c);
            Ok(())
        }
        Keepalive(c) => keepalive(c).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_options_fall_back_to_defaults() {
        let opts = ServerOptions::try_parse_from([
            "ledger-consoled",
            "--client-id",
            "console",
            "--redirect-uri",
            "https://console.example.com/",
            "--openid-config-url",
            "https://idp.example.com",
            "--api-url",
            "https://api.example.com",
            "--encryption-key",
            "k",
        ])
        .unwrap();
        let settings = opts.settings();

        assert_eq!(opts.listen, "127.0.0.1:3000".parse().unwrap());
        assert!(settings.secure_cookies);
        assert!(settings.client_secret.is_none());
        assert_eq!(settings.origin.0, "https://console.example.com");
        assert_eq!(settings.discovery_ttl, Duration::from_secs(300));
        assert_eq!(settings.http_timeout, Duration::from_secs(10));
        assert_eq!(settings.api.auth, "https://api.example.com/api/auth");
        assert!(settings.scope.has_refresh());
    }

    #[test]
    fn secure_cookies_can_be_turned_off() {
        let opts = ServerOptions::try_parse_from([
            "ledger-consoled",
            "--client-id=console",
            "--redirect-uri=http://localhost:3000",
            "--openid-config-url=http://localhost:8080",
            "--api-url=http://localhost:8080",
            "--encryption-key=k",
            "--secure-cookies=false",
        ])
        .unwrap();
        assert!(!opts.settings().secure_cookies);
    }
}
