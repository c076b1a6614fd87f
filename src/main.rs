//! Headless popover host.
//!
//! Reads host page events as JSON lines on stdin, drives the popover, and
//! prints every rendered overlay snapshot as a JSON line on stdout. Logs go
//! to stderr (`RUST_LOG`, default `info`).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use explain_popover_lib::core::cache::RedbStore;
use explain_popover_lib::core::explain::HttpTransport;
use explain_popover_lib::core::popover::PendingExplanation;
use explain_popover_lib::shared::error::AppResult;
use explain_popover_lib::shared::events::PopoverEvent;
use explain_popover_lib::shared::settings::AppSettings;
use explain_popover_lib::shared::types::HostEvent;
use explain_popover_lib::system::overlay::OverlaySurface;
use explain_popover_lib::{init_popover, HostBindings, SelectionWatcher};

/// Prints rendered snapshots to stdout
#[derive(Default)]
struct StdoutSurface {
    mounted: std::sync::atomic::AtomicBool,
}

impl OverlaySurface for StdoutSurface {
    fn is_mounted(&self) -> bool {
        self.mounted.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn emit(&self, event: PopoverEvent) {
        if let PopoverEvent::Mounted(_) = event {
            self.mounted.store(true, std::sync::atomic::Ordering::SeqCst);
        }
        match serde_json::to_string(&event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "failed to serialize popover event"),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "explain-popover exited with error");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let settings = AppSettings::load().await?;

    let bindings = HostBindings {
        surface: Arc::new(StdoutSurface::default()),
        storage: RedbStore::open_default_or_memory(),
        transport: Arc::new(HttpTransport::new()),
    };

    let Some(controller) = init_popover(settings.init_options(), bindings)? else {
        return Ok(());
    };
    let watcher = SelectionWatcher::new(controller);
    info!("reading host events from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_pending: Option<PendingExplanation> = None;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: HostEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "skipping malformed host event");
                continue;
            }
        };

        if let Some(pending) = watcher.handle(event).and_then(|p| p.into_pending()) {
            last_pending = Some(pending);
        }
    }

    // Older requests were superseded; only the latest can still change the overlay
    if let Some(pending) = last_pending {
        pending.wait().await;
    }

    Ok(())
}
