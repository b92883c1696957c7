//! Watch command - run until interrupted.

use std::time::Duration;

use anyhow::Context;

use crate::config::Settings;
use crate::session::Session;

/// How long to wait for the dispatcher after unsubscribing.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let session = Session::new(settings)?;
    let running = session.start()?;

    println!(
        "Watching {} for changes. Press Ctrl+C to stop.",
        session.engine().watchlist().path().display()
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    let stopping = tokio::task::spawn_blocking(move || running.stop());
    match tokio::time::timeout(SHUTDOWN_GRACE, stopping).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("[watcher] shutdown task failed: {e}"),
        Err(_) => tracing::warn!(
            "[watcher] event dispatcher did not stop within {}s",
            SHUTDOWN_GRACE.as_secs()
        ),
    }

    println!("\nStopped watching.");
    Ok(())
}
