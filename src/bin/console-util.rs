use clap::Parser;

#[tokio::main]
async fn main() {
    use ledger_console::util::cli::*;

    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let opts = Options::parse();
    if let Err(e) = run_cli_action(opts).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
