pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod inspect;
pub mod io_utils;
pub mod jsonb;
pub mod mapper;
pub mod normalize;
pub mod resolver;
pub mod schema_probe;
pub mod statement;
pub mod table;
pub mod variant;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("oura_inserts", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => batch::execute(&args),
        Commands::Inspect(args) => inspect::execute(&args),
    }
}
