use anyhow::Result;
use colored::Colorize;
use skyclock::prelude::*;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Prints every catalog event's timings, then keeps the engine running so
/// date changes show up in the log.
///
/// Usage: `skydev [CONFIG.toml] [--once]`
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // 2. Load configuration from the optional path argument.
    let mut config_path: Option<PathBuf> = None;
    let mut once = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--once" => once = true,
            path => config_path = Some(PathBuf::from(path)),
        }
    }

    // 3. Create the SkyclockEngine instance.
    let engine = SkyclockEngine::load(config_path.as_deref())?;
    info!(
        "{} v{} loaded {} events",
        skyclock::ENGINE_NAME,
        skyclock::VERSION,
        engine.catalog().len()
    );

    // 4. Dump every event's timings.
    print_all_timings(&engine);
    if once {
        return Ok(());
    }

    // 5. Run the engine.
    spawn_event_listeners(&engine);
    engine.run().await?;

    Ok(())
}

fn print_all_timings(engine: &SkyclockEngine) {
    let now = engine.now();
    println!("{} {}", "Now:".dimmed(), now.format("%A, %B %-d, %Y %-I:%M:%S %p %Z"));

    for (_, event) in engine.catalog().iter() {
        println!();
        println!(
            "{} {}",
            event.name.cyan().bold(),
            format!("[{} / {}]", event.category, event.recurrence.kind()).dimmed()
        );
        match event.timings(&now) {
            Ok(entries) => {
                for entry in entries {
                    let rendered = engine.format_with(&entry.instant, "%f (%R)", &now);
                    println!("  {:<18} {}", entry.label, rendered.display);
                    println!("  {:<18} {}", "", rendered.markup.dimmed());
                    if let Some(description) = &entry.description {
                        println!("  {:<18} {}", "", description.italic());
                    }
                }
            }
            Err(e) => warn!("{}: {}", event.name, e),
        }
    }
}

/// Spawns a task that logs every system event from the engine.
fn spawn_event_listeners(engine: &SkyclockEngine) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });
}
