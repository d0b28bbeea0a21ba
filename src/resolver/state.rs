//! Resolution state machine for a single handle.
//!
//! All methods are pure state transitions with no I/O. The current
//! [`Phase`] alone decides which upstream operation may run next, so a
//! step that is not permitted is simply unreachable. Error strings are
//! machine-readable reasons.

use crate::stream::{
    ChannelHandle, ChannelId, Decision, FallbackRef, LiveVideoId, ResolutionState, Update,
};

use super::strategy::{ChannelOutcome, IdSource, Strategy, Verdict};

/// Internal phase; each variant carries exactly the data valid in it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    ResolvingChannel(Strategy),
    ResolvingLive(ChannelId),
    ResolvedLive(LiveVideoId),
    ResolvedFallback(FallbackRef),
    Failed,
}

/// An upstream call the machine is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Channel(Strategy),
    LiveCheck(ChannelId),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Channel(strategy) => strategy.name(),
            Operation::LiveCheck(_) => "live_check",
        }
    }
}

/// Result of an [`Operation`], errors already folded away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Channel(ChannelOutcome),
    Live(Option<LiveVideoId>),
}

/// What the driver should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Leave `Idle`.
    Start,
    /// Perform one upstream call, then [`Resolution::advance`].
    Call(Operation),
    /// Move `Failed` on to its fallback without a call.
    Settle,
    /// Terminal; nothing else will ever run for this handle.
    Done,
}

/// Resolution state for one handle.
///
/// Owned exclusively by its driver. No concurrent access.
#[derive(Debug, Clone)]
pub struct Resolution {
    handle: ChannelHandle,
    phase: Phase,
    /// Set at most once; never overwritten.
    channel_id: Option<ChannelId>,
}

impl Resolution {
    pub fn new(handle: ChannelHandle) -> Self {
        Self {
            handle,
            phase: Phase::Idle,
            channel_id: None,
        }
    }

    pub fn handle(&self) -> &ChannelHandle {
        &self.handle
    }

    pub fn state(&self) -> ResolutionState {
        match self.phase {
            Phase::Idle => ResolutionState::Idle,
            Phase::ResolvingChannel(_) => ResolutionState::ResolvingChannel,
            Phase::ResolvingLive(_) => ResolutionState::ResolvingLive,
            Phase::ResolvedLive(_) => ResolutionState::ResolvedLive,
            Phase::ResolvedFallback(_) => ResolutionState::ResolvedFallback,
            Phase::Failed => ResolutionState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn step(&self) -> Step {
        match &self.phase {
            Phase::Idle => Step::Start,
            Phase::ResolvingChannel(strategy) => Step::Call(Operation::Channel(*strategy)),
            Phase::ResolvingLive(id) => Step::Call(Operation::LiveCheck(id.clone())),
            Phase::Failed => Step::Settle,
            Phase::ResolvedLive(_) | Phase::ResolvedFallback(_) => Step::Done,
        }
    }

    /// `Idle` → `ResolvingChannel` at the first strategy.
    pub fn start(&mut self) -> Result<(), &'static str> {
        if self.phase != Phase::Idle {
            return Err("already_started");
        }
        self.phase = Phase::ResolvingChannel(Strategy::first());
        Ok(())
    }

    /// Apply the outcome of the operation returned by [`step`](Self::step).
    pub fn advance(&mut self, outcome: Outcome) -> Result<(), &'static str> {
        let next = match (self.phase.clone(), outcome) {
            (Phase::ResolvingChannel(strategy), Outcome::Channel(outcome)) => {
                match strategy.on_outcome(outcome) {
                    Verdict::Accept(id, source) => {
                        self.record_channel(id.clone())?;
                        match source {
                            IdSource::Scraped => {
                                Phase::ResolvedFallback(FallbackRef::Channel(id))
                            }
                            IdSource::Api => Phase::ResolvingLive(id),
                        }
                    }
                    Verdict::Next(next) => Phase::ResolvingChannel(next),
                    Verdict::Exhausted => Phase::Failed,
                }
            }
            (Phase::ResolvingLive(id), Outcome::Live(video)) => match video {
                Some(video) => Phase::ResolvedLive(video),
                None => Phase::ResolvedFallback(FallbackRef::Channel(id)),
            },
            (Phase::ResolvingChannel(_) | Phase::ResolvingLive(_), _) => {
                return Err("outcome_mismatch");
            }
            _ => return Err("not_awaiting_outcome"),
        };
        self.phase = next;
        Ok(())
    }

    /// `Failed` → `ResolvedFallback` on the raw handle.
    pub fn settle(&mut self) -> Result<(), &'static str> {
        if self.phase != Phase::Failed {
            return Err("not_failed");
        }
        self.phase = Phase::ResolvedFallback(FallbackRef::Handle(self.handle.clone()));
        Ok(())
    }

    /// Force a terminal fallback from any non-terminal phase, using the
    /// best reference known so far.
    pub fn abandon(&mut self) {
        if !self.is_terminal() {
            self.phase = Phase::ResolvedFallback(self.fallback_ref());
        }
    }

    /// Current best decision. Provisional until terminal.
    pub fn decision(&self) -> Decision {
        match &self.phase {
            Phase::ResolvedLive(video) => Decision::PlayLive(video.clone()),
            Phase::ResolvedFallback(reference) => Decision::PlayFallback(reference.clone()),
            _ => Decision::PlayFallback(self.fallback_ref()),
        }
    }

    pub fn update(&self) -> Update {
        Update {
            handle: self.handle.clone(),
            state: self.state(),
            decision: self.decision(),
        }
    }

    fn fallback_ref(&self) -> FallbackRef {
        match &self.channel_id {
            Some(id) => FallbackRef::Channel(id.clone()),
            None => FallbackRef::Handle(self.handle.clone()),
        }
    }

    fn record_channel(&mut self, id: ChannelId) -> Result<(), &'static str> {
        if self.channel_id.is_some() {
            return Err("channel_id_already_set");
        }
        self.channel_id = Some(id);
        Ok(())
    }
}
