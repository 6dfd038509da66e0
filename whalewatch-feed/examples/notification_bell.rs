//! Drive the shared notification store and toast scheduler, printing the
//! bell state (unread count, connectivity, active toasts) as it changes.

use std::sync::Arc;

use whalewatch_feed::{FeedConfig, NotificationService, ToastScheduler, spawn_toast_driver};

#[tokio::main]
async fn main() {
    // Initialise INFO Tracing log subscriber
    init_logging();

    println!("\n🔔 WHALE NOTIFICATION BELL");
    println!("💡 Waiting for whale alerts (ctrl-c to quit)...\n");

    let mut service = NotificationService::start(FeedConfig::default());
    let store = service.store();

    let toasts = Arc::new(ToastScheduler::new());
    let driver = spawn_toast_driver(service.store(), Arc::clone(&toasts));

    let mut revisions = store.subscribe();
    let mut toast_revisions = toasts.subscribe();
    let mut connection = service.connection();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = toast_revisions.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = connection.changed() => {}
        }

        let status = if connection.borrow().is_open() {
            "live"
        } else {
            "disconnected"
        };
        println!(
            "🔔 {:>2} unread / {:>2} total | {} | toasts: {}",
            store.unread_count(),
            store.len(),
            status,
            toasts
                .active()
                .iter()
                .map(|t| t.id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    println!("\n👋 Shutting down...");
    driver.abort();
    service.shutdown();
}

fn init_logging() {
    tracing_subscriber::fmt()
        // Filter messages based on the INFO
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        // Install this Tracing subscriber as global default
        .init()
}
