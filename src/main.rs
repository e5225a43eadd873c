//! tola-partials - render a site with reusable partials.

use anyhow::Result;
use clap::Parser;
use tola_partials::{
    build::{build_site, clean_generated},
    cli::{Cli, Commands},
    config::SiteConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => build_site(&config).await.map(|_| ()),
        Commands::Clean => clean_generated(&config),
    }
}
