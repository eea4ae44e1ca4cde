use std::{future::Future, io};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::warning;

/// Exit status after a forced quit (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

/// Waits for interrupts from `next_interrupt`.
///
/// The first one cancels `cancel` so running work can wind down; the
/// function then returns `true` on a second one. Returns `false` without
/// cancelling when no interrupt can be received.
pub async fn wait_for_interrupts<F, Fut>(cancel: CancellationToken, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }

    warning!("Stopping after the current song. Press Ctrl-C again to quit now.");
    cancel.cancel();

    next_interrupt().await.is_ok()
}

/// Installs the Ctrl-C handler: first press cancels `cancel`, second exits.
pub fn spawn_interrupt_handler(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if wait_for_interrupts(cancel, tokio::signal::ctrl_c).await {
            warning!("Interrupted again, quitting.");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}
