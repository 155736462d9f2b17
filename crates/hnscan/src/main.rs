#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod client;
mod error;
mod prelude;
mod scan;

#[derive(Debug, clap::Parser)]
#[command(
    name = "hnscan",
    author,
    version,
    about = "Scan HackerNews ranked lists for recent stories"
)]
pub struct App {
    #[clap(flatten)]
    pub options: scan::ScanOptions,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, global = true, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    scan::run(app.options, app.global).await
}
