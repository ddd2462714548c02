// FILE: crates/cli/src/player.rs

//! Interactive terminal player driving a `SessionController`

use crate::input::{parse_command, PlayerCommand, HELP};
use anyhow::{Context, Result};
use console::style;
use media_engine::{
    EngineResult, HeadlessTransportFactory, NowPlayingInfo, NowPlayingPublisher,
    SessionController, SessionServices, SessionSettings, SessionState,
};
use shelfplay_config::Config;
use shelfplay_core::{format_clock, ItemId};
use shelfplay_network::HttpGateway;
use shelfplay_sync_engine::GatewaySink;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Longest wait for the final progress push on quit
const TEARDOWN_FLUSH_LIMIT: Duration = Duration::from_secs(3);

/// Prints a line whenever the chapter or play state changes
#[derive(Default)]
struct TerminalPublisher {
    last: Mutex<Option<(Option<String>, bool)>>,
}

impl NowPlayingPublisher for TerminalPublisher {
    fn publish(&self, info: &NowPlayingInfo) {
        let Ok(mut last) = self.last.lock() else {
            return;
        };
        let current = (info.chapter_title.clone(), info.is_playing);
        if last.as_ref() == Some(&current) {
            return;
        }
        *last = Some(current);

        let marker = if info.is_playing { "▶" } else { "⏸" };
        let chapter = info
            .chapter_title
            .as_deref()
            .map(|t| format!(" | {}", t))
            .unwrap_or_default();
        println!(
            "{} {}{} [{} / {}]",
            style(marker).green(),
            style(&info.title).bold(),
            style(chapter).dim(),
            format_clock(info.position),
            format_clock(info.duration)
        );
    }

    fn clear(&self) {
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
    }
}

fn build_services(config: &Config) -> Result<SessionServices> {
    let gateway = Arc::new(
        HttpGateway::from_config(&config.server).context("Failed to set up server connection")?,
    );
    let transports = HeadlessTransportFactory::new(Duration::from_millis(
        config.player.tick_interval_ms,
    ))
    .with_prefetch(config.streaming.initial_window_segments);

    Ok(SessionServices {
        gateway: gateway.clone(),
        fetcher: gateway.clone(),
        sink: Arc::new(GatewaySink::new(gateway)),
        transports: Arc::new(transports),
        now_playing: Arc::new(TerminalPublisher::default()),
    })
}

/// Runs the player until `q` or end of input
pub async fn run(config: &Config, item_id: &str, start_paused: bool) -> Result<()> {
    let services = build_services(config)?;
    let mut settings = SessionSettings::from_config(config);
    if start_paused {
        settings.auto_play = false;
    }

    let (mut controller, mut events) = SessionController::new(services, settings);
    controller.open(ItemId::new(item_id));
    println!(
        "Opening {} ... type {} for commands",
        style(item_id).cyan(),
        style("h").bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_state = controller.state().clone();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                controller.apply(event);
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_line(&mut controller, &line) {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        }

        if *controller.state() != last_state {
            last_state = controller.state().clone();
            report_state(&controller, &last_state);
        }
    }

    if let Some(drain) = controller.close() {
        if drain.settled_within(TEARDOWN_FLUSH_LIMIT).await {
            println!("Progress saved.");
        } else {
            log::warn!(
                "Progress push still pending after {}s, exiting anyway",
                TEARDOWN_FLUSH_LIMIT.as_secs()
            );
        }
    }

    Ok(())
}

fn report_state(controller: &SessionController, state: &SessionState) {
    match state {
        SessionState::Ready => println!("{}", style("Ready").green()),
        SessionState::Suspended => println!(
            "{} at {}",
            style("Sleep timer reached").yellow(),
            format_clock(controller.position())
        ),
        SessionState::Error(message) => {
            eprintln!("{} {}", style("Error:").red().bold(), message);
            eprintln!("Type {} to try again or {} to quit", style("retry").bold(), style("q").bold());
        }
        _ => log::debug!("Session is now {}", state),
    }
}

/// Returns false when the player should exit
fn handle_line(controller: &mut SessionController, line: &str) -> bool {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(e) => {
            eprintln!("{}", style(e).red());
            return true;
        }
    };

    let outcome = match command {
        PlayerCommand::Quit => return false,
        PlayerCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        PlayerCommand::Info => {
            print_snapshot(controller);
            Ok(())
        }
        PlayerCommand::TogglePlay => controller.toggle(),
        PlayerCommand::NextChapter => controller.skip(1),
        PlayerCommand::PreviousChapter => controller.skip(-1),
        PlayerCommand::JumpForward => controller.jump_forward(),
        PlayerCommand::JumpBackward => controller.jump_backward(),
        PlayerCommand::SeekTo(seconds) => controller.seek(seconds),
        PlayerCommand::Rate(rate) => controller.set_rate(rate).map(|()| {
            println!("Speed {:.2}x", rate);
        }),
        PlayerCommand::Sleep(chapters) => set_sleep(controller, chapters),
        PlayerCommand::Retry => controller.retry(),
    };

    if let Err(e) = outcome {
        eprintln!("{}", style(e).red());
    }
    true
}

fn set_sleep(controller: &mut SessionController, chapters: u8) -> EngineResult<()> {
    match controller.set_sleep_chapters(chapters)? {
        Some(target) => println!(
            "Sleeping after {} chapter(s), at {}",
            chapters,
            format_clock(target)
        ),
        None if chapters == 0 => println!("Sleep timer off"),
        None => println!("This item has no chapters to count"),
    }
    Ok(())
}

fn print_snapshot(controller: &SessionController) {
    let snapshot = controller.snapshot();

    println!("{}", "=".repeat(60));
    if let Some(metadata) = &snapshot.metadata {
        println!("{}", style(&metadata.title).bold().cyan());
        if let Some(author) = &metadata.author {
            println!("  by {}", author);
        }
    }
    println!("  State:    {}", snapshot.state);
    println!(
        "  Position: {} / {}",
        format_clock(snapshot.position),
        format_clock(snapshot.duration)
    );
    if let Some(title) = &snapshot.chapter_title {
        println!("  Chapter:  {} ({})", title, snapshot.chapter_progress);
    }
    println!("  Speed:    {:.2}x", snapshot.rate.value());
    if let Some(strategy) = snapshot.strategy {
        println!("  Stream:   {}", strategy);
    }
    match snapshot.sleep.target_time {
        Some(target) => println!(
            "  Sleep:    {} chapter(s), at {}",
            snapshot.sleep.chapters_remaining,
            format_clock(target)
        ),
        None => println!("  Sleep:    off"),
    }
    if snapshot.is_finished {
        println!("  {}", style("Finished").green());
    }
    if let Some(sync) = snapshot.sync {
        println!(
            "  Sync:     {} pushed, {} failed, {} coalesced",
            sync.pushes_attempted, sync.pushes_failed, sync.pushes_coalesced
        );
    }
    println!("{}", "=".repeat(60));
}
