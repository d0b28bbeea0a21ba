use clap::{Parser, Subcommand};

use crate::upstream::http::DEFAULT_API_URL;

#[derive(Parser)]
#[command(name = "adrift", about = "YouTube live stream resolver for side-by-side viewing")]
pub struct Cli {
    /// Upstream API endpoint
    #[arg(long, global = true, env = "ADRIFT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve one channel handle and print the playback decision
    Resolve {
        /// YouTube channel handle (leading @ optional)
        handle: String,

        /// Print every intermediate update, not just the final one
        #[arg(long)]
        follow: bool,
    },

    /// Follow a handle, switching whenever a new one is read from stdin
    Watch {
        /// Initial YouTube channel handle
        #[arg(long)]
        youtube: String,

        /// Twitch channel shown in the chat pane
        #[arg(long)]
        twitch: Option<String>,

        /// Domain the chat embed is served from
        #[arg(long, env = "ADRIFT_CHAT_DOMAIN", default_value = "localhost")]
        chat_domain: String,
    },
}
