use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

/// Evaluate admin console access decisions for a user profile
#[derive(Parser, Debug)]
#[command(name = "warden", about = "Console access diagnostics")]
pub struct Cli {
    /// User profile JSON; omit to evaluate as a signed-out visitor
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Guard configuration JSON (overrides WARDEN_* environment variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the route guard for a navigation, e.g. `/users?tab=roles`
    Check { href: String },

    /// List modules the profile can open
    Modules,

    /// Explain why the profile can or cannot open a module
    Explain { module: String },

    /// Show the permission registry per role and per key
    Registry,
}

#[tokio::main]
async fn main() -> Result<()> {
    warden_observability::init();

    let cli = Cli::parse();
    let output = commands::run(&cli).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
