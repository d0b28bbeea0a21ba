//! Stream identity: handles, provider identifiers, and the playback
//! decision exposed to callers.
//!
//! A [`ChannelHandle`] is normalized exactly once, here, before any
//! upstream operation sees it. Everything downstream works with the
//! already-stripped form.

use std::fmt;

/// Errors produced while normalizing a user-supplied handle.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("channel handle is empty")]
    Empty,
}

/// A user-supplied channel handle with its leading `@` marker removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelHandle(String);

impl ChannelHandle {
    /// Normalize a raw handle.
    ///
    /// Surrounding whitespace is trimmed and a single leading `@` is
    /// stripped. Returns [`HandleError::Empty`] if nothing remains.
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(HandleError::Empty);
        }
        Ok(Self(stripped.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Provider-durable channel identifier (e.g. `UC...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wrap a raw identifier. Empty strings are not identifiers.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier of a currently broadcasting video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveVideoId(String);

impl LiveVideoId {
    /// Wrap a raw identifier. Empty strings are not identifiers.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LiveVideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Best-effort playback reference used when no live video is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackRef {
    Channel(ChannelId),
    Handle(ChannelHandle),
}

impl fmt::Display for FallbackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackRef::Channel(id) => fmt::Display::fmt(id, f),
            FallbackRef::Handle(handle) => fmt::Display::fmt(handle, f),
        }
    }
}

/// What the playback surface should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    PlayLive(LiveVideoId),
    PlayFallback(FallbackRef),
}

/// Resolution progress for a single handle.
///
/// Ordering is forward-only: `Idle < ResolvingChannel < ResolvingLive <
/// terminal`. `Failed` is recorded on the way to `ResolvedFallback` when
/// no channel id could be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    ResolvingChannel,
    ResolvingLive,
    ResolvedLive,
    ResolvedFallback,
    Failed,
}

impl ResolutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionState::ResolvedLive | ResolutionState::ResolvedFallback
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionState::Idle => "idle",
            ResolutionState::ResolvingChannel => "resolving_channel",
            ResolutionState::ResolvingLive => "resolving_live",
            ResolutionState::ResolvedLive => "resolved_live",
            ResolutionState::ResolvedFallback => "resolved_fallback",
            ResolutionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One observable step of a resolution: the state just entered and the
/// best decision available in it.
///
/// Non-terminal updates carry a provisional fallback decision so the
/// caller always has something playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub handle: ChannelHandle,
    pub state: ResolutionState,
    pub decision: Decision,
}

impl Update {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
