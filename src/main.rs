mod app;
mod config;
mod error;
mod input;
mod logging;
mod model;
mod render;
mod sim;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    app::run(&args)
}
