#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use clap::Parser as _;
use repobrowse_cli::{Cli, run};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    run(&cli, &mut std::io::stdout().lock())
}
