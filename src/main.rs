#![allow(dead_code)]

mod cli;
mod application;
mod domain;
mod data;
mod infra;

use anyhow::Result;
use cli::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG wins; otherwise this crate logs at info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chatbot_pipeline=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    cli.run()
}
