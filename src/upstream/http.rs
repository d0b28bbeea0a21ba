//! HTTP adapter for the upstream API.
//!
//! All four operations hit one endpoint, selected by the `action` query
//! parameter: `GET {base}?action=<scrape|channel|search|live>&username=<h>`
//! (plus `channelId=<id>` for `live`). Bodies are JSON.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::stream::{ChannelHandle, ChannelId, LiveVideoId};

use super::protocol::{ChannelResponse, ScrapeResponse, SearchResponse};
use super::{Upstream, UpstreamError};

/// Default upstream endpoint (the companion web app's API route).
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/youtube";

/// Upstream backed by the companion web API.
///
/// No request timeout is configured; calls wait as long as the
/// underlying client does.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        action: &str,
        handle: &ChannelHandle,
        channel_id: Option<&ChannelId>,
    ) -> Result<T, UpstreamError> {
        let mut query = vec![("action", action), ("username", handle.as_str())];
        if let Some(id) = channel_id {
            query.push(("channelId", id.as_str()));
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::QuotaExceeded);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        resp.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                UpstreamError::Decode(e.to_string())
            } else {
                UpstreamError::Transport(e.to_string())
            }
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn scrape(&self, handle: &ChannelHandle) -> Result<Option<ChannelId>, UpstreamError> {
        let resp: ScrapeResponse = self.get("scrape", handle, None).await?;
        if let Some(reason) = &resp.error {
            tracing::debug!(handle = %handle, reason = %reason, "scrape reported error");
        }
        Ok(resp.channel_id())
    }

    async fn channel_lookup(
        &self,
        handle: &ChannelHandle,
    ) -> Result<Option<ChannelId>, UpstreamError> {
        let resp: ChannelResponse = self.get("channel", handle, None).await?;
        Ok(resp.channel_id())
    }

    async fn search(&self, handle: &ChannelHandle) -> Result<Option<ChannelId>, UpstreamError> {
        let resp: SearchResponse = self.get("search", handle, None).await?;
        Ok(resp.channel_id())
    }

    async fn live_check(
        &self,
        handle: &ChannelHandle,
        channel_id: &ChannelId,
    ) -> Result<Option<LiveVideoId>, UpstreamError> {
        let resp: SearchResponse = self.get("live", handle, Some(channel_id)).await?;
        Ok(resp.live_video_id())
    }
}
