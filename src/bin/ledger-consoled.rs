use clap::Parser;
use tracing::{event, Level};

#[tokio::main]
async fn main() {
    use ledger_console::util::cli::*;

    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let opts = ServerOptions::parse();
    if let Err(e) = run_server(opts).await {
        event!(Level::ERROR, error = %e, "Console failed to start");
        std::process::exit(1);
    }
}
