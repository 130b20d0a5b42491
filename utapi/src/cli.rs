use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use utapi_config::{Config, OverridableConfig};
use utapi_server::ServiceState;

use crate::cliapp::make_app;
use crate::setup;

fn load_config(path: &Path, require: bool) -> Result<Config> {
    match Config::from_path(path) {
        Ok(config) => Ok(config),
        Err(error) => {
            if !require && error.is_missing_file() {
                return Ok(Config::default());
            }

            Err(error).context("failed to load config")
        }
    }
}

/// Runs the command line application.
pub fn execute() -> Result<()> {
    let matches = make_app().get_matches();
    let config_path = matches
        .get_one::<String>("config")
        .map_or_else(|| PathBuf::from("utapi.yml"), PathBuf::from);

    // Commands that do not need a loaded config:
    if let Some(matches) = matches.subcommand_matches("config") {
        if matches.subcommand_matches("init").is_some() {
            Config::init(&config_path)?;
            println!("wrote default config to {}", config_path.display());
            return Ok(());
        }
    }

    let mut config = load_config(&config_path, matches.contains_id("config"))?;
    // Override file config with environment variables.
    config.apply_override(extract_config_env_vars())?;

    if let Some(matches) = matches.subcommand_matches("config") {
        if matches.subcommand_matches("show").is_some() {
            print!("{}", config.to_yaml());
            return Ok(());
        }
    }

    if let Some(matches) = matches.subcommand_matches("run") {
        // Override config with run command args.
        config.apply_override(extract_config_args(matches))?;
        utapi_log::init(config.logging());
        return run(config);
    }

    Ok(())
}

/// Extracts config overrides from a parsed command line.
fn extract_config_args(matches: &ArgMatches) -> OverridableConfig {
    OverridableConfig {
        component: None,
        host: matches.get_one("host").cloned(),
        port: matches.get_one("port").cloned(),
        redis_host: matches.get_one("redis_host").cloned(),
        redis_port: matches.get_one("redis_port").cloned(),
    }
}

/// Extracts config overrides from environment variables.
fn extract_config_env_vars() -> OverridableConfig {
    OverridableConfig {
        component: env::var("UTAPI_COMPONENT").ok(),
        host: env::var("UTAPI_HOST").ok(),
        port: env::var("UTAPI_PORT").ok(),
        redis_host: env::var("UTAPI_REDIS_HOST").ok(),
        redis_port: env::var("UTAPI_REDIS_PORT").ok(),
    }
}

fn run(config: Config) -> Result<()> {
    setup::dump_spawn_infos(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers())
        .thread_name("utapi")
        .enable_all()
        .build()
        .context("failed to build the runtime")?;

    let state = ServiceState::create(config)?;
    runtime.block_on(utapi_server::serve(state))?;

    Ok(())
}
