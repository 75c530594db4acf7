//! Command orchestration helpers from UI actions to backend command queue.

use client_core::FormState;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. When the queue refuses it, the
/// failure is written to `state` and an in-flight prediction is abandoned.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    state: &mut FormState,
) -> bool {
    let cmd_name = cmd.name();

    let failure = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return true;
        }
        Err(TrySendError::Full(_)) => "Red naredbi je pun; pokušajte ponovo.",
        Err(TrySendError::Disconnected(_)) => {
            concat!(
                "Pozadinski servis nije dostupan (backend worker disconnected); ",
                "ponovno pokrenite aplikaciju."
            )
        }
    };

    tracing::warn!(command = cmd_name, "failed to queue ui->backend command: {failure}");
    if state.is_processing() {
        state.fail_prediction(&failure);
    } else {
        state.set_error(failure);
    }
    false
}
