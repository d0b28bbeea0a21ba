//! Stream-identity resolver: handle to channel id to live video.
//!
//! [`state::Resolution`] is the pure state machine and
//! [`strategy`] holds the ordered channel strategies. This module is
//! the driver: it runs whichever single operation the machine permits,
//! folds upstream errors into "no result", and feeds the outcome back.
//!
//! Upstream faults never escape. Every resolution ends in a terminal
//! decision, falling back to the raw handle if nothing else worked.

pub mod state;
pub mod strategy;

use std::sync::Arc;

use futures::{Stream, StreamExt};

use crate::stream::{ChannelHandle, Decision, Update};
use crate::upstream::{Upstream, UpstreamError};

use state::{Operation, Outcome, Resolution, Step};
use strategy::{ChannelOp, ChannelOutcome};

/// Resolve `handle`, yielding an [`Update`] after every transition.
///
/// Lazy and finite: nothing runs until polled, and the stream ends right
/// after the terminal update. At most one upstream call is outstanding.
pub fn resolve(
    upstream: Arc<dyn Upstream>,
    handle: ChannelHandle,
) -> impl Stream<Item = Update> + Send {
    futures::stream::unfold(Resolution::new(handle), move |mut resolution| {
        let upstream = Arc::clone(&upstream);
        async move {
            if resolution.is_terminal() {
                return None;
            }
            drive_once(&mut resolution, upstream.as_ref()).await;
            let update = resolution.update();
            log_update(&update);
            Some((update, resolution))
        }
    })
}

/// Run `handle` to completion and return the terminal update.
pub async fn resolve_to_end(upstream: Arc<dyn Upstream>, handle: ChannelHandle) -> Update {
    let mut updates = Box::pin(resolve(upstream, handle.clone()));
    let mut last = None;
    while let Some(update) = updates.next().await {
        last = Some(update);
    }
    // The stream always yields at least once; this only guards the type.
    last.unwrap_or_else(|| {
        let mut resolution = Resolution::new(handle);
        resolution.abandon();
        resolution.update()
    })
}

/// Perform the next step of `resolution`, including its upstream call.
async fn drive_once(resolution: &mut Resolution, upstream: &dyn Upstream) {
    let result = match resolution.step() {
        Step::Start => resolution.start(),
        Step::Call(op) => {
            let outcome = execute(upstream, resolution.handle(), &op).await;
            resolution.advance(outcome)
        }
        Step::Settle => resolution.settle(),
        Step::Done => Ok(()),
    };
    if let Err(reason) = result {
        tracing::error!(handle = %resolution.handle(), reason, "invalid transition, abandoning");
        resolution.abandon();
    }
}

/// Perform one upstream call and fold its result into an [`Outcome`].
///
/// Quota exhaustion survives as its own outcome; every other fault is
/// logged and becomes "nothing found".
pub async fn execute(upstream: &dyn Upstream, handle: &ChannelHandle, op: &Operation) -> Outcome {
    tracing::debug!(handle = %handle, step = op.name(), "starting step");

    match op {
        Operation::Channel(strategy) => {
            let result = match strategy.operation() {
                ChannelOp::Scrape => upstream.scrape(handle).await,
                ChannelOp::ChannelLookup => upstream.channel_lookup(handle).await,
                ChannelOp::Search => upstream.search(handle).await,
            };
            let outcome = match result {
                Ok(Some(id)) => {
                    tracing::debug!(handle = %handle, step = op.name(), channel_id = %id, "channel found");
                    ChannelOutcome::Found(id)
                }
                Ok(None) => {
                    tracing::debug!(handle = %handle, step = op.name(), "no channel");
                    ChannelOutcome::Nothing
                }
                Err(UpstreamError::QuotaExceeded) => {
                    tracing::warn!(handle = %handle, step = op.name(), "api quota exceeded");
                    ChannelOutcome::QuotaExceeded
                }
                Err(e) => {
                    tracing::warn!(handle = %handle, step = op.name(), error = %e, "step failed");
                    ChannelOutcome::Nothing
                }
            };
            Outcome::Channel(outcome)
        }
        Operation::LiveCheck(channel_id) => {
            let video = match upstream.live_check(handle, channel_id).await {
                Ok(video) => video,
                Err(e) => {
                    tracing::warn!(handle = %handle, step = op.name(), error = %e, "step failed");
                    None
                }
            };
            Outcome::Live(video)
        }
    }
}

/// Log an update; terminal decisions at info.
pub(crate) fn log_update(update: &Update) {
    if !update.is_terminal() {
        tracing::debug!(handle = %update.handle, state = %update.state, "state changed");
        return;
    }
    match &update.decision {
        Decision::PlayLive(video) => {
            tracing::info!(handle = %update.handle, video_id = %video, "live broadcast found");
        }
        Decision::PlayFallback(reference) => {
            tracing::info!(handle = %update.handle, reference = %reference, "using fallback");
        }
    }
}
