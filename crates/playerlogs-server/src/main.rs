mod config;
mod feed;
mod host;
mod settings;
mod stats;

use std::time::Duration;

use config::ServerConfig;
use host::Host;
use tokio::io::AsyncBufReadExt;
use tracing::info;

/// One scheduler tick per second, so module intervals are in seconds.
const TICK: Duration = Duration::from_secs(1);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match ServerConfig::load_or_default("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "PlayerLogs v{} starting, data dir {}",
        env!("CARGO_PKG_VERSION"),
        config.server.data_dir.display()
    );

    let mut host = Host::new(config);
    info!("{}", host.status());

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console: verbs and JSON events from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(256);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut ticks = tick_interval(TICK);
    // The first tick of a tokio interval completes immediately.
    ticks.tick().await;

    let mut console_open = true;
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                host.tick();
            }
            line = console_rx.recv(), if console_open => {
                match line {
                    Some(line) => {
                        if !host.handle_line(&line) {
                            break;
                        }
                    }
                    // stdin closed; keep ticking until a signal arrives
                    None => console_open = false,
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    host.shutdown();
    info!("PlayerLogs shut down.");
}

/// A stalled loop delivers one late tick, then resumes one `period` later.
/// Missed ticks are never replayed back to back.
fn tick_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}
