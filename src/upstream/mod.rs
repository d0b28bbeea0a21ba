//! Upstream operations: the four provider calls the resolver composes.
//!
//! Each operation is one independent network request. Implementations
//! report "nothing found" as `Ok(None)` and reserve `Err` for faults;
//! the resolver decides which faults matter.

pub mod http;
pub mod protocol;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::stream::{ChannelHandle, ChannelId, LiveVideoId};

/// Upstream failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Provider rate limit (HTTP 429).
    #[error("quota exceeded")]
    QuotaExceeded,
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode: {0}")]
    Decode(String),
}

/// The four upstream operations, keyed by handle.
///
/// `Send + Sync` because the session actor issues calls from spawned
/// tasks.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Scrape the channel page for its id. Not quota-limited.
    async fn scrape(&self, handle: &ChannelHandle) -> Result<Option<ChannelId>, UpstreamError>;

    /// Look the handle up through the provider's channel API.
    async fn channel_lookup(
        &self,
        handle: &ChannelHandle,
    ) -> Result<Option<ChannelId>, UpstreamError>;

    /// Search the provider for a channel matching the handle.
    async fn search(&self, handle: &ChannelHandle) -> Result<Option<ChannelId>, UpstreamError>;

    /// Find a currently live broadcast on the channel.
    async fn live_check(
        &self,
        handle: &ChannelHandle,
        channel_id: &ChannelId,
    ) -> Result<Option<LiveVideoId>, UpstreamError>;
}
