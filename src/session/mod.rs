//! Resolution session: follows whichever handle the consumer shows now.
//!
//! Architecture: channel-based actor. A single session loop owns the
//! active [`Resolution`] and its generation. Upstream calls run as
//! spawned tasks that report back over an mpsc channel, tagged with
//! the generation that issued them. A handle change bumps the
//! generation, so a late result for a superseded handle no longer
//! matches and is dropped on arrival. In-flight calls are never
//! cancelled.
//!
//! The latest [`Update`] is published through a `watch` channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use crate::resolver::state::{Outcome, Resolution, Step};
use crate::resolver::{execute, log_update};
use crate::stream::{ChannelHandle, Update};
use crate::upstream::Upstream;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session closed")]
    Closed,
}

/// Token stamped on every upstream call. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug)]
enum Command {
    SetHandle(ChannelHandle),
}

/// An upstream call's outcome on its way back to the loop.
#[derive(Debug)]
struct StepResult {
    generation: Generation,
    outcome: Outcome,
}

/// The resolution currently on screen.
#[derive(Debug)]
struct Active {
    generation: Generation,
    resolution: Resolution,
}

/// Handle to a running session loop.
#[derive(Debug)]
pub struct Session {
    cmd_tx: mpsc::UnboundedSender<Command>,
    updates: watch::Receiver<Option<Update>>,
    task: JoinHandle<()>,
}

impl Session {
    /// Spawn the session loop on the current tokio runtime.
    pub fn spawn(upstream: Arc<dyn Upstream>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (update_tx, updates) = watch::channel(None);
        let task = tokio::spawn(run(upstream, cmd_rx, update_tx));
        Self {
            cmd_tx,
            updates,
            task,
        }
    }

    /// Switch to `handle`. Re-sending the active handle is a no-op.
    pub fn set_handle(&self, handle: ChannelHandle) -> Result<(), SessionError> {
        self.cmd_tx
            .send(Command::SetHandle(handle))
            .map_err(|_| SessionError::Closed)
    }

    /// Latest update, `None` until a handle has been set.
    pub fn current(&self) -> Option<Update> {
        self.updates.borrow().clone()
    }

    /// Every published update as a stream (latest-value semantics).
    pub fn updates(&self) -> WatchStream<Option<Update>> {
        WatchStream::new(self.updates.clone())
    }

    /// Wait until `handle` reaches a terminal update.
    pub async fn wait_terminal(&self, handle: &ChannelHandle) -> Result<Update, SessionError> {
        let mut rx = self.updates.clone();
        let update = rx
            .wait_for(|u| {
                u.as_ref()
                    .is_some_and(|u| &u.handle == handle && u.is_terminal())
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        update.clone().ok_or(SessionError::Closed)
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        drop(self.cmd_tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "session task ended abnormally");
        }
    }
}

/// Session loop. Exits when every command sender is gone.
async fn run(
    upstream: Arc<dyn Upstream>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    update_tx: watch::Sender<Option<Update>>,
) {
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<StepResult>();
    let mut active: Option<Active> = None;
    let mut next_generation = 0u64;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(Command::SetHandle(handle)) = cmd else {
                    break;
                };
                if active.as_ref().is_some_and(|a| a.resolution.handle() == &handle) {
                    tracing::debug!(handle = %handle, "handle unchanged");
                    continue;
                }
                next_generation += 1;
                let generation = Generation(next_generation);
                tracing::debug!(handle = %handle, generation = generation.0, "handle changed, resetting");

                let current = active.insert(Active {
                    generation,
                    resolution: Resolution::new(handle),
                });
                publish(&update_tx, &current.resolution);
                pump(current, &upstream, &result_tx, &update_tx);
            }

            Some(result) = result_rx.recv() => {
                let Some(current) = active.as_mut().filter(|a| a.generation == result.generation) else {
                    tracing::debug!(generation = result.generation.0, "discarding superseded result");
                    continue;
                };
                if let Err(reason) = current.resolution.advance(result.outcome) {
                    tracing::error!(handle = %current.resolution.handle(), reason, "invalid transition, abandoning");
                    current.resolution.abandon();
                }
                publish(&update_tx, &current.resolution);
                pump(current, &upstream, &result_tx, &update_tx);
            }
        }
    }

    tracing::debug!("session stopped");
}

/// Advance `active` through call-free steps, then launch its next
/// upstream call, if any. Never launches more than one.
fn pump(
    active: &mut Active,
    upstream: &Arc<dyn Upstream>,
    result_tx: &mpsc::UnboundedSender<StepResult>,
    update_tx: &watch::Sender<Option<Update>>,
) {
    loop {
        let result = match active.resolution.step() {
            Step::Start => active.resolution.start(),
            Step::Settle => active.resolution.settle(),
            Step::Done => return,
            Step::Call(op) => {
                let upstream = Arc::clone(upstream);
                let result_tx = result_tx.clone();
                let handle = active.resolution.handle().clone();
                let generation = active.generation;
                tokio::spawn(async move {
                    let outcome = execute(upstream.as_ref(), &handle, &op).await;
                    // Loop gone means nobody is watching anymore.
                    let _ = result_tx.send(StepResult {
                        generation,
                        outcome,
                    });
                });
                return;
            }
        };
        if let Err(reason) = result {
            tracing::error!(handle = %active.resolution.handle(), reason, "invalid transition, abandoning");
            active.resolution.abandon();
        }
        publish(update_tx, &active.resolution);
    }
}

fn publish(update_tx: &watch::Sender<Option<Update>>, resolution: &Resolution) {
    let update = resolution.update();
    log_update(&update);
    update_tx.send_replace(Some(update));
}
