//! `watch`: run the bridge against the terminal host until Ctrl-C.

use std::sync::Arc;

use ccsbridge_core::Bridge;

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::console::ConsoleHost;
use crate::error::CliError;
use crate::output;

pub async fn handle(resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let host = Arc::new(ConsoleHost::new(
        global.output,
        output::should_color(global.color),
        global.quiet,
    ));
    let bridge = Bridge::new(host, resolved.transport);

    // A rejected config has already been reported as a status line.
    bridge.init(resolved.bridge).await?;
    tracing::info!(profile = %resolved.profile_name, "bridge running, press Ctrl-C to stop");

    let mut snapshots = bridge.subscribe();
    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => break signal,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                tracing::debug!(
                    logged_in = snapshot.logged_in,
                    speakers = ?snapshot.speakers.iter().map(|s| s.id).collect::<Vec<_>>(),
                    "poll result"
                );
            }
        }
    };

    bridge.destroy().await;
    tracing::info!("bridge stopped");
    result.map_err(CliError::from)
}
