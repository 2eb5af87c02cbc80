use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use colored::Colorize;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use skyclock::format::{self, FORMAT_PRESETS};
use skyclock::prelude::*;
use skyclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

const LOGO_TEXT: &str = r"
   ____  _              _            _
  / ___|| | ___   _ ___| | ___   ___| | __
  \___ \| |/ / | | / __| |/ _ \ / __| |/ /
   ___) |   <| |_| \__ \ | (_) | (__|   <
  |____/|_|\_\\__, |___/_|\___/ \___|_|\_\
              |___/
";

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct MyHighlighter;

impl Highlighter for MyHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", LOGO_TEXT.cyan());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    let rule = "-".repeat(64);

    println!("{}", rule.dimmed());
    println!("{}", version_string);
    let license_blurb = "
    This software is provided 'as is', without warranty of any kind.
    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.
    ";
    println!("{}", license_blurb.dimmed());
    println!("{}", rule.dimmed());
}

/// What `follow` re-renders on every tick.
struct FollowState {
    event: Option<String>,
    format_code: String,
}

impl FollowState {
    fn new(format_code: &str) -> Self {
        Self {
            event: None,
            format_code: format_code.to_string(),
        }
    }
}

/// Waits for the next message, skipping over any the receiver fell behind on.
/// Returns `None` once every sender is gone.
async fn next_message<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Option<T> {
    loop {
        match rx.recv().await {
            Ok(message) => return Some(message),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "listener lagged behind"),
            Err(RecvError::Closed) => return None,
        }
    }
}

/// One live line for a followed event: its first two timings in `code`.
fn follow_line(
    engine: &SkyclockEngine,
    query: &str,
    code: &str,
    now: &DateTime<Tz>,
) -> skyclock::error::Result<(String, String)> {
    let (event, entries) = engine.timings(query, now)?;
    let summary: Vec<String> = entries
        .iter()
        .take(2)
        .map(|entry| {
            let rendered = engine.format_with(&entry.instant, code, now);
            format!("{} {}", entry.label, rendered.display)
        })
        .collect();
    Ok((event.name.clone(), summary.join(" | ")))
}

/// Spawns tasks that print system events and, while following, live timings.
fn spawn_event_listeners(
    engine: &SkyclockEngine,
    is_following: Arc<AtomicBool>,
    follow_state: Arc<RwLock<FollowState>>,
) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Some(event) = next_message(&mut system_rx).await {
            match event {
                SystemEvent::DateChanged { new_date } => {
                    println!("\n<-- [NEW DAY] {} (resets have rolled over)\n>> ", new_date)
                }
                other => println!("\n<-- [SYSTEM EVENT] {:?}\n>> ", other),
            }
        }
    });

    let mut tick_rx = engine.subscribe_ticks();
    let engine = engine.clone();
    tokio::spawn(async move {
        while let Some(tick) = next_message(&mut tick_rx).await {
            if !is_following.load(Ordering::Relaxed) || tick.tick_count % 5 != 0 {
                continue;
            }
            let target = match follow_state.read() {
                Ok(state) => state
                    .event
                    .clone()
                    .map(|event| (event, state.format_code.clone())),
                Err(_) => None,
            };
            let Some((query, code)) = target else { continue };
            match follow_line(&engine, &query, &code, &tick.timestamp) {
                Ok((name, summary)) => println!("<-- [{}] {}", name.cyan(), summary),
                Err(e) => println!("<-- [FOLLOW] {}", e.to_string().red()),
            }
        }
    });
}

fn set_follow_format(follow_state: &RwLock<FollowState>, code: &str) {
    if let Ok(mut state) = follow_state.write() {
        state.format_code = code.to_string();
    }
}

fn print_event_list(engine: &SkyclockEngine, query: &str) {
    let hits = engine.catalog().search(query);
    if hits.is_empty() {
        println!("No events match '{}'.", query);
        return;
    }
    let mut current_category = None;
    for (_, event) in hits {
        if query.is_empty() && current_category != Some(event.category) {
            println!("{}", event.category.label().bold());
            current_category = Some(event.category);
        }
        let aliases = if event.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", event.aliases.join(", "))
        };
        println!(
            "  {:<24}{} {}",
            event.name,
            aliases.dimmed(),
            event.full_slug().dimmed()
        );
    }
}

fn print_timings(engine: &SkyclockEngine, query: &str, code: &str) {
    let now = engine.now();
    match engine.timings(query, &now) {
        Ok((event, entries)) => {
            println!(
                "{} {}",
                event.name.cyan().bold(),
                format!("[{}]", event.category).dimmed()
            );
            for entry in entries {
                let rendered = engine.format_with(&entry.instant, code, &now);
                println!("  {:<18} {}", entry.label, rendered.display);
                println!("  {:<18} {}", "", rendered.markup.dimmed());
                if let Some(description) = &entry.description {
                    println!("  {:<18} {}", "", description.italic());
                }
            }
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn print_formats(engine: &SkyclockEngine, current: &str) {
    let now = engine.now();
    for (index, code) in FORMAT_PRESETS.iter().enumerate() {
        let marker = if *code == current { "*" } else { " " };
        let rendered = format::format(&now, code, &now);
        println!("{} {:>2}. {:<10} {}", marker, index + 1, code, rendered.display);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let engine = SkyclockEngine::load(config_path.as_deref())?;
    let engine_handle = engine.clone();

    // Create the shared flag and target for the tick listener.
    let is_following = Arc::new(AtomicBool::new(false));
    let follow_state = Arc::new(RwLock::new(FollowState::new(
        &engine_handle.config().format_code,
    )));
    spawn_event_listeners(&engine_handle, is_following.clone(), follow_state.clone());

    info!("Spawning {} in the background...", ENGINE_NAME.cyan());
    tokio::spawn(async move {
        if let Err(e) = engine.run().await {
            eprintln!("\nEngine stopped with an error: {}", e);
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut format_code = engine_handle.config().format_code.clone();

    let mut rl = Editor::new()?;
    let helper = MyHighlighter {};
    rl.set_helper(Some(helper));

    println!("{} is running. Type 'help' for commands or 'exit' to quit.", ENGINE_NAME.cyan());

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let line = line.trim();
                let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
                let rest = rest.trim();

                match command {
                    "list" => print_event_list(&engine_handle, ""),
                    "search" => {
                        if rest.is_empty() {
                            println!("Usage: search <TEXT>");
                        } else {
                            print_event_list(&engine_handle, rest);
                        }
                    }
                    "show" => {
                        if rest.is_empty() {
                            println!("Usage: show <EVENT>");
                        } else {
                            print_timings(&engine_handle, rest, &format_code);
                        }
                    }
                    "formats" => print_formats(&engine_handle, &format_code),
                    "format" => {
                        if rest.is_empty() {
                            println!("--> Current format code: {}", format_code);
                        } else if let Ok(number) = rest.parse::<usize>() {
                            match FORMAT_PRESETS.get(number.wrapping_sub(1)) {
                                Some(code) => {
                                    format_code = code.to_string();
                                    set_follow_format(&follow_state, &format_code);
                                    println!("--> Format code set to {}", format_code);
                                }
                                None => println!(
                                    "Error: pick a preset between 1 and {}.",
                                    FORMAT_PRESETS.len()
                                ),
                            }
                        } else {
                            format_code = rest.to_string();
                            set_follow_format(&follow_state, &format_code);
                            println!("--> Format code set to {}", format_code);
                        }
                    }
                    "follow" => {
                        if rest.is_empty() {
                            println!("Usage: follow <EVENT>");
                        } else if let Err(e) = engine_handle.catalog().require(rest) {
                            println!("Error: {}", e);
                        } else {
                            if let Ok(mut state) = follow_state.write() {
                                state.event = Some(rest.to_string());
                            }
                            is_following.store(true, Ordering::Relaxed);
                            println!("--> Following '{}' on the live clock.", rest);
                        }
                    }
                    "unfollow" => {
                        is_following.store(false, Ordering::Relaxed);
                        println!("--> Stopped following.");
                    }
                    "help" => {
                        println!("Available commands:");
                        println!("  list                  - Lists every event by category.");
                        println!("  search <TEXT>         - Finds events by name or alias.");
                        println!("  show <EVENT>          - Prints an event's timings.");
                        println!("  formats               - Lists the format presets.");
                        println!("  format [CODE|N]       - Shows or sets the format code.");
                        println!("  follow <EVENT>        - Prints an event's timings as the clock ticks.");
                        println!("  unfollow              - Stops following.");
                        println!("  exit                  - Quits the shell.");
                    }
                    "exit" => break,
                    "" => {}
                    _ => println!("Unknown command: '{}'. Type 'help'.", line),
                }
            }
            Err(_) => {
                println!("Exiting skyshell...");
                break;
            }
        }
    }

    Ok(())
}
