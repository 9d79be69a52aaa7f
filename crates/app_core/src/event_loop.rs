//! Drives a session from the backend event stream and a command channel
//!
//! Registration events are buffered and applied once per batch window so a
//! bulk import costs one store update per window instead of one per file.
//! Everything else is applied as it arrives.

use crate::backend::EventStream;
use crate::command::Command;
use crate::session::Session;
use futures::StreamExt;
use ipc_proto::{BackendAction, ImageFile};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Default batch window for registration events
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_millis(500);

/// What happened during one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopStats {
    /// Size of every applied batch, in order
    pub batches: Vec<usize>,
    pub actions: usize,
    pub commands: usize,
    pub failed_commands: usize,
    pub stream_faults: usize,
}

impl LoopStats {
    pub fn registered(&self) -> usize {
        self.batches.iter().sum()
    }
}

fn flush(session: &mut Session, pending: &mut Vec<ImageFile>, stats: &mut LoopStats) {
    if pending.is_empty() {
        return;
    }
    let batch = std::mem::take(pending);
    tracing::debug!("Applying batch of {} registrations", batch.len());
    stats.batches.push(batch.len());
    session.register_batch(batch);
}

async fn apply_command(session: &mut Session, command: Command, stats: &mut LoopStats) {
    stats.commands += 1;
    let name = command.name();
    if let Err(e) = session.apply(command).await {
        stats.failed_commands += 1;
        if e.is_contract_violation() {
            tracing::error!("Command {} violated a contract: {}", name, e);
        } else {
            tracing::warn!("Command {} failed: {}", name, e);
        }
    }
}

/// Run until the event stream ends.
///
/// Commands already queued when the stream ends are applied before pending
/// registrations are flushed. The command receiver stays open so the caller
/// can reconnect and call this again with the same channel.
pub async fn run(
    session: &mut Session,
    mut events: EventStream,
    commands: &mut mpsc::Receiver<Command>,
    window: Duration,
) -> LoopStats {
    let mut stats = LoopStats::default();
    let mut pending: Vec<ImageFile> = Vec::new();
    let mut commands_open = true;

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + window, window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(BackendAction::FileRegistered { image }))
                | Some(Ok(BackendAction::ThumbnailUpdated { image })) => pending.push(image),
                Some(Ok(action)) => {
                    stats.actions += 1;
                    session.handle_action(action);
                }
                Some(Err(e)) => {
                    stats.stream_faults += 1;
                    tracing::warn!("Backend stream fault: {}", e);
                }
                None => break,
            },
            command = commands.recv(), if commands_open => match command {
                Some(command) => apply_command(session, command, &mut stats).await,
                None => commands_open = false,
            },
            _ = ticker.tick() => flush(session, &mut pending, &mut stats),
        }
    }

    while let Ok(command) = commands.try_recv() {
        apply_command(session, command, &mut stats).await;
    }

    flush(session, &mut pending, &mut stats);
    tracing::info!(
        "Event stream ended: {} registrations in {} batches, {} faults",
        stats.registered(),
        stats.batches.len(),
        stats.stream_faults
    );
    stats
}
