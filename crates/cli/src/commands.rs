// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use shelfplay_config::{Config, ConfigManager, InitOutcome};
use shelfplay_core::{format_clock, ItemId, LibraryItem, ProgressRecord};
use shelfplay_network::{HttpGateway, MediaGateway};

use crate::player;

/// Play an item in the interactive player
pub async fn play_item(config: &Config, item_id: &str, start_paused: bool) -> Result<()> {
    require_server(config)?;
    player::run(config, item_id, start_paused).await
}

/// Show an item with its chapters and saved progress
pub async fn show_item_info(config: &Config, matches: &ArgMatches) -> Result<()> {
    let item_id = matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow::anyhow!("Item ID is required"))?;
    require_server(config)?;

    let gateway = HttpGateway::from_config(&config.server)
        .context("Failed to set up server connection")?;
    let id = ItemId::new(item_id.as_str());

    let (item, progress) = tokio::join!(gateway.fetch_item(&id), gateway.fetch_progress(&id));
    let item = item.with_context(|| format!("Failed to fetch item {}", id))?;
    let progress = progress.unwrap_or_else(|e| {
        log::warn!("Could not load progress for {}: {}", id, e);
        None
    });

    if matches.get_flag("json") {
        let json = item_json(&item, progress.as_ref());
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_item(&item, progress.as_ref());
    }

    Ok(())
}

/// Dispatch `config` subcommands
pub fn config_command(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", sub_matches)) => {
            let outcome = manager
                .initialize(sub_matches.get_flag("force"))
                .context("Failed to write config file")?;
            let path = manager.config_path();
            match outcome {
                InitOutcome::Created => {
                    println!("{} Created {}", style("✓").green(), path.display())
                }
                InitOutcome::Replaced { backup } => println!(
                    "{} Reset {} (previous file saved as {})",
                    style("✓").green(),
                    path.display(),
                    backup.display()
                ),
                InitOutcome::Existing => println!(
                    "Config already exists at {} (use --force to replace it)",
                    path.display()
                ),
            }
        }
        Some(("show", _)) => {
            let rendered = toml::to_string_pretty(&redacted(config))
                .context("Failed to render configuration")?;
            println!("{}", rendered);
        }
        Some(("validate", _)) => {
            let problems = manager.validate().context("Failed to load config file")?;
            if problems.is_empty() {
                println!("{} Configuration is valid", style("✓").green());
            } else {
                for problem in &problems {
                    eprintln!("{} {}", style("✗").red(), problem);
                }
                bail!("{} problem(s) in {}", problems.len(), manager.config_path().display());
            }
        }
        Some(("path", _)) => println!("{}", manager.config_path().display()),
        _ => bail!("Unknown config subcommand"),
    }
    Ok(())
}

fn require_server(config: &Config) -> Result<()> {
    if config.server.base_url.trim().is_empty() {
        bail!("No server configured. Pass --server or run 'shelfplay config init' and edit the file.");
    }
    Ok(())
}

/// Copy of the config safe to print
pub(crate) fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if !shown.server.token.is_empty() {
        shown.server.token = "********".to_string();
    }
    shown
}

pub(crate) fn item_json(item: &LibraryItem, progress: Option<&ProgressRecord>) -> serde_json::Value {
    serde_json::json!({
        "item": item,
        "progress": progress,
    })
}

fn print_item(item: &LibraryItem, progress: Option<&ProgressRecord>) {
    let metadata = &item.metadata;

    println!("\n{}", style(&metadata.title).bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID:       {}", item.id);
    if let Some(author) = &metadata.author {
        println!("Author:   {}", author);
    }
    if let Some(narrator) = &metadata.narrator {
        println!("Narrator: {}", narrator);
    }
    if let Some(series) = &metadata.series {
        println!("Series:   {}", series);
    }
    println!("Duration: {}", format_clock(item.duration));

    if !item.renditions.is_empty() {
        println!("\n{}", style("Streams").bold());
        for rendition in &item.renditions {
            let bitrate = rendition
                .bitrate
                .map(|b| format!(" @ {} kbps", b / 1000))
                .unwrap_or_default();
            println!("  {:?}{}", rendition.kind, bitrate);
        }
    }

    if item.chapters.is_empty() {
        println!("\nNo chapters");
    } else {
        println!("\n{} ({})", style("Chapters").bold(), item.chapters.len());
        for chapter in &item.chapters {
            println!("{}", chapter_line(chapter.index, &chapter.title, chapter.start, chapter.end));
        }
    }

    println!();
    match progress {
        Some(record) if record.is_finished => {
            println!("Progress: {}", style("finished").green());
        }
        Some(record) => println!(
            "Progress: {} ({:.0}%)",
            format_clock(record.current_time),
            record.progress * 100.0
        ),
        None => println!("Progress: {}", style("not started").dim()),
    }
}

pub(crate) fn chapter_line(index: usize, title: &str, start: f64, end: f64) -> String {
    format!(
        "  {:>3}. {:<40} {} - {}",
        index + 1,
        title,
        format_clock(start),
        format_clock(end)
    )
}
