//! Embed references for the playback and chat panes.

use crate::stream::{Decision, FallbackRef};

/// Playback embed URL for a decision.
pub fn player_url(decision: &Decision) -> String {
    match decision {
        Decision::PlayLive(video) => format!(
            "https://www.youtube.com/embed/{}?autoplay=1",
            video.as_str()
        ),
        Decision::PlayFallback(FallbackRef::Channel(channel)) => format!(
            "https://www.youtube.com/embed/live_stream?channel={}",
            channel.as_str()
        ),
        Decision::PlayFallback(FallbackRef::Handle(handle)) => format!(
            "https://www.youtube.com/embed?frame=1&listType=user_uploads&list={}&live=1&autoplay=1",
            handle.as_str()
        ),
    }
}

/// Twitch chat embed URL. `parent` is the embedding site's domain.
pub fn chat_url(channel: &str, parent: &str) -> String {
    format!("https://www.twitch.tv/embed/{channel}/chat?parent={parent}&darkpopout")
}
