//! codeforge CLI binary
//!
//! Minimal entrypoint: parse arguments, install tracing, hand over to
//! cli::run().

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = codeforge::cli::Cli::parse();
    codeforge::cli::init_tracing(cli.verbose);
    codeforge::cli::run(cli).await
}
