// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use shelfplay_config::{Config, ConfigManager};
use std::path::PathBuf;

mod commands;
mod input;
mod player;

fn build_cli() -> Command {
    Command::new("shelfplay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Listen to audiobooks from your library server")
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .value_name("URL")
                .help("Library server base URL (overrides config)")
                .global(true),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .value_name("TOKEN")
                .help("API token (overrides config)")
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(
            Command::new("play")
                .about("Play an audiobook, resuming from saved progress")
                .arg(Arg::new("id").required(true).value_name("ITEM_ID").help("Library item id"))
                .arg(
                    Arg::new("paused")
                        .long("paused")
                        .help("Open at the resume point without starting playback")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("info")
                .about("Show an item with its chapters and saved progress")
                .arg(Arg::new("id").required(true).value_name("ITEM_ID").help("Library item id"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the item as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(
                    Command::new("init")
                        .about("Write a default config file if none exists")
                        .arg(
                            Arg::new("force")
                                .long("force")
                                .help("Replace an existing file, keeping a backup")
                                .action(clap::ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("validate").about("Check the config file for invalid values"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")
}

/// File, then `SHELFPLAY_*` variables, then command-line flags
fn load_config(manager: &ConfigManager, matches: &ArgMatches) -> Result<Config> {
    let mut config = manager
        .load_with_env_overrides()
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;

    if let Some(server) = matches.get_one::<String>("server") {
        config.server.base_url = server.clone();
    }
    if let Some(token) = matches.get_one::<String>("token") {
        config.server.token = token.clone();
    }
    Ok(config)
}

fn init_logging(config: &Config) {
    let default_level = config.app.log_level.to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(&matches)?;
    let config = load_config(&manager, &matches)?;
    init_logging(&config);

    match matches.subcommand() {
        Some(("play", sub_matches)) => {
            let item_id = sub_matches
                .get_one::<String>("id")
                .ok_or_else(|| anyhow::anyhow!("Item ID is required"))?;
            let start_paused = sub_matches.get_flag("paused");
            commands::play_item(&config, item_id, start_paused).await
        }
        Some(("info", sub_matches)) => commands::show_item_info(&config, sub_matches).await,
        Some(("config", sub_matches)) => commands::config_command(&manager, &config, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
