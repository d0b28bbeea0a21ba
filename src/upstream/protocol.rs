//! Response shapes returned by the four upstream actions.
//!
//! All fields are optional on the wire; a response that parses but
//! carries nothing usable normalizes to `None`.

use serde::Deserialize;

use crate::stream::{ChannelId, LiveVideoId};

/// `action=scrape` response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Present when the scraper gave up; informational only.
    #[serde(default)]
    pub error: Option<String>,
}

impl ScrapeResponse {
    pub fn channel_id(self) -> Option<ChannelId> {
        self.channel_id.and_then(ChannelId::new)
    }
}

/// A single item of a channel lookup.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChannelItem {
    #[serde(default)]
    pub id: Option<String>,
}

/// `action=channel` response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChannelResponse {
    #[serde(default)]
    pub items: Option<Vec<ChannelItem>>,
}

impl ChannelResponse {
    /// Channel id of the first returned item.
    pub fn channel_id(self) -> Option<ChannelId> {
        self.items?.into_iter().next()?.id.and_then(ChannelId::new)
    }
}

/// Object form of a search/live item id.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// An item id, which the provider returns either as a bare string or
/// as a resource object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ItemId {
    Raw(String),
    Resource(ResourceId),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub snippet: Option<Snippet>,
}

/// `action=search` and `action=live` responses share this shape.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Option<Vec<SearchItem>>,
}

impl SearchResponse {
    fn first(self) -> Option<SearchItem> {
        self.items?.into_iter().next()
    }

    /// Channel id of the first search hit.
    ///
    /// A bare string id wins; otherwise the snippet's `channelId`, then
    /// a `channelId` nested in the id object.
    pub fn channel_id(self) -> Option<ChannelId> {
        let item = self.first()?;
        let nested = match item.id {
            Some(ItemId::Raw(raw)) => {
                if let Some(id) = ChannelId::new(raw) {
                    return Some(id);
                }
                None
            }
            Some(ItemId::Resource(resource)) => resource.channel_id,
            None => None,
        };
        item.snippet
            .and_then(|s| s.channel_id)
            .and_then(ChannelId::new)
            .or_else(|| nested.and_then(ChannelId::new))
    }

    /// Video id of the first live hit, from either id shape.
    pub fn live_video_id(self) -> Option<LiveVideoId> {
        match self.first()?.id? {
            ItemId::Raw(raw) => LiveVideoId::new(raw),
            ItemId::Resource(resource) => resource.video_id.and_then(LiveVideoId::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn scrape_with_channel() {
        let r: ScrapeResponse = serde_json::from_str(r#"{"channelId":"UC123"}"#).unwrap();
        assert_eq!(r.channel_id().unwrap().as_str(), "UC123");
    }

    #[test]
    fn scrape_error_only() {
        let r: ScrapeResponse = serde_json::from_str(r#"{"error":"not found"}"#).unwrap();
        assert!(r.channel_id().is_none());
    }

    #[test]
    fn scrape_empty_string_is_no_id() {
        let r: ScrapeResponse = serde_json::from_str(r#"{"channelId":""}"#).unwrap();
        assert!(r.channel_id().is_none());
    }

    #[test]
    fn channel_lookup_takes_first_item() {
        let r: ChannelResponse =
            serde_json::from_str(r#"{"items":[{"id":"UC456"},{"id":"UC000"}]}"#).unwrap();
        assert_eq!(r.channel_id().unwrap().as_str(), "UC456");
    }

    #[test]
    fn channel_lookup_without_items() {
        let r: ChannelResponse = serde_json::from_str("{}").unwrap();
        assert!(r.channel_id().is_none());
        let r: ChannelResponse = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(r.channel_id().is_none());
    }

    #[test]
    fn search_id_shapes_normalize_identically() {
        let raw = search(r#"{"items":[{"id":"UC777"}]}"#).channel_id();
        let snippet = search(
            r#"{"items":[{"id":{"kind":"youtube#channel"},"snippet":{"channelId":"UC777"}}]}"#,
        )
        .channel_id();
        let nested = search(r#"{"items":[{"id":{"channelId":"UC777"}}]}"#).channel_id();
        assert_eq!(raw, snippet);
        assert_eq!(raw, nested);
        assert_eq!(raw.unwrap().as_str(), "UC777");
    }

    #[test]
    fn search_empty_raw_id_falls_through_to_snippet() {
        let r = search(r#"{"items":[{"id":"","snippet":{"channelId":"UC1"}}]}"#);
        assert_eq!(r.channel_id().unwrap().as_str(), "UC1");
    }

    #[test]
    fn search_nothing_usable() {
        assert!(search(r#"{"items":[{"id":{}}]}"#).channel_id().is_none());
        assert!(search("{}").channel_id().is_none());
    }

    #[test]
    fn live_id_shapes_normalize_identically() {
        let raw = search(r#"{"items":[{"id":"V789"}]}"#).live_video_id();
        let object = search(r#"{"items":[{"id":{"kind":"youtube#video","videoId":"V789"}}]}"#)
            .live_video_id();
        assert_eq!(raw, object);
        assert_eq!(raw.unwrap().as_str(), "V789");
    }

    #[test]
    fn live_object_without_video_id() {
        assert!(
            search(r#"{"items":[{"id":{"channelId":"UC1"}}]}"#)
                .live_video_id()
                .is_none()
        );
    }
}
