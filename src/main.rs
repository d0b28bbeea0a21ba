mod cli;
mod client;
mod embed;
mod resolver;
mod session;
mod stream;
mod upstream;

use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;
use upstream::http::HttpUpstream;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let upstream = HttpUpstream::new(cli.api_url);
    tracing::debug!(api_url = upstream.base_url(), "using upstream");

    if let Err(e) = client::run(cli.command, Arc::new(upstream)).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("adrift: {e}");
        std::process::exit(1);
    }
}
