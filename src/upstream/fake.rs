//! Scripted in-memory upstream for tests.
//!
//! Replies are queued per (handle, operation); an unscripted call
//! answers `Ok(None)`. Every call is recorded in order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::stream::{ChannelHandle, ChannelId, LiveVideoId};

use super::{Upstream, UpstreamError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Scrape,
    ChannelLookup,
    Search,
    LiveCheck,
}

/// A recorded call: operation plus the handle it was keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub handle: String,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Id(&'static str),
    Empty,
    Quota,
    Fail,
}

#[derive(Default)]
pub struct FakeUpstream {
    script: Mutex<HashMap<(String, Op), VecDeque<Reply>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next `op` call on `handle`.
    pub fn reply(self, handle: &str, op: Op, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry((handle.to_string(), op))
            .or_default()
            .push_back(reply);
        self
    }

    /// Hold every call for `handle` until the returned notify fires.
    /// Each `notify_one` releases one call.
    pub fn gate(&self, handle: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(handle.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.calls().into_iter().map(|c| c.op).collect()
    }

    async fn answer(
        &self,
        op: Op,
        handle: &ChannelHandle,
        channel_id: Option<&ChannelId>,
    ) -> Result<Option<String>, UpstreamError> {
        self.calls.lock().unwrap().push(Call {
            op,
            handle: handle.as_str().to_string(),
            channel_id: channel_id.map(|c| c.as_str().to_string()),
        });

        let gate = self.gates.lock().unwrap().get(handle.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self
            .script
            .lock()
            .unwrap()
            .get_mut(&(handle.as_str().to_string(), op))
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Empty);

        match reply {
            Reply::Id(id) => Ok(Some(id.to_string())),
            Reply::Empty => Ok(None),
            Reply::Quota => Err(UpstreamError::QuotaExceeded),
            Reply::Fail => Err(UpstreamError::Transport("connection reset".into())),
        }
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn scrape(&self, handle: &ChannelHandle) -> Result<Option<ChannelId>, UpstreamError> {
        Ok(self
            .answer(Op::Scrape, handle, None)
            .await?
            .and_then(ChannelId::new))
    }

    async fn channel_lookup(
        &self,
        handle: &ChannelHandle,
    ) -> Result<Option<ChannelId>, UpstreamError> {
        Ok(self
            .answer(Op::ChannelLookup, handle, None)
            .await?
            .and_then(ChannelId::new))
    }

    async fn search(&self, handle: &ChannelHandle) -> Result<Option<ChannelId>, UpstreamError> {
        Ok(self
            .answer(Op::Search, handle, None)
            .await?
            .and_then(ChannelId::new))
    }

    async fn live_check(
        &self,
        handle: &ChannelHandle,
        channel_id: &ChannelId,
    ) -> Result<Option<LiveVideoId>, UpstreamError> {
        Ok(self
            .answer(Op::LiveCheck, handle, Some(channel_id))
            .await?
            .and_then(LiveVideoId::new))
    }
}
