//! rise-rest-rs: terminal companion for morning and evening rituals.

mod affirmations;
mod breathing;
mod config;
mod content;
mod flow;
mod goals;
mod intention;
mod narrator;
mod notifier;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rise-rest-rs", about = "Morning and evening wellness ritual companion")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which ritual to run: rise (morning) or rest (evening)
    #[arg(short, long, default_value = "rise")]
    flow: String,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging (suppress noisy HTTP internals)
    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("rise-rest-rs starting");

    let config = config::Config::load(args.config.as_deref());

    let kind = flow::FlowKind::from_str(&args.flow);
    info!("Flow: {kind:?}");

    let mut flow = flow::RitualFlow::new(config, kind);
    flow.run().await?;

    Ok(())
}
