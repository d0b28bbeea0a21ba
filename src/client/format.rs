//! Output formatting for CLI commands.
//!
//! One status line per update on stdout; embed URLs follow terminal
//! decisions so they can be piped straight into a browser.

use crate::embed;
use crate::stream::{Decision, FallbackRef, Update};

/// Print a single update as a status line.
pub fn print_update(update: &Update) {
    println!("{}", update_line(update));
}

/// Print a terminal update with its player embed URL.
pub fn print_decision(update: &Update) {
    println!("{}", update_line(update));
    println!("Player: {}", embed::player_url(&update.decision));
}

pub fn print_chat(channel: &str, domain: &str) {
    println!("Chat:   {}", embed::chat_url(channel, domain));
}

fn update_line(update: &Update) -> String {
    format!(
        "{:<24} {:<18} {}",
        update.handle,
        update.state,
        describe(&update.decision)
    )
}

/// Human-readable decision, e.g. `live V789` or `channel UC123`.
fn describe(decision: &Decision) -> String {
    match decision {
        Decision::PlayLive(video) => format!("live {video}"),
        Decision::PlayFallback(FallbackRef::Channel(channel)) => format!("channel {channel}"),
        Decision::PlayFallback(FallbackRef::Handle(handle)) => format!("uploads {handle}"),
    }
}
