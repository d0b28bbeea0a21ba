//! Channel-identification strategies, in the order they are tried.
//!
//! Each strategy names the upstream operation it performs and decides,
//! purely from that operation's outcome, whether to accept an id, hand
//! over to the next strategy, or give up.

use crate::stream::ChannelId;

/// Upstream operation performed by a channel strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOp {
    Scrape,
    ChannelLookup,
    Search,
}

/// Where an accepted channel id came from.
///
/// Scraped ids go straight to fallback playback; API ids are
/// live-checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Scraped,
    Api,
}

/// Outcome of a channel operation after error folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Found(ChannelId),
    Nothing,
    QuotaExceeded,
}

/// What to do after a strategy ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept(ChannelId, IdSource),
    Next(Strategy),
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Page scrape; preferred because it spends no API quota.
    Scrape,
    ChannelLookup,
    Search,
    /// Last-chance scrape after both API strategies came back empty.
    ScrapeRetry,
    /// Scrape issued immediately after `ChannelLookup` hit the quota.
    QuotaScrape,
}

/// The regular ordering. `QuotaScrape` is only reachable from a 429.
pub const CHANNEL_STRATEGIES: [Strategy; 4] = [
    Strategy::Scrape,
    Strategy::ChannelLookup,
    Strategy::Search,
    Strategy::ScrapeRetry,
];

impl Strategy {
    pub fn first() -> Self {
        CHANNEL_STRATEGIES[0]
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Scrape => "scrape",
            Strategy::ChannelLookup => "channel_lookup",
            Strategy::Search => "search",
            Strategy::ScrapeRetry => "scrape_retry",
            Strategy::QuotaScrape => "quota_scrape",
        }
    }

    pub fn operation(self) -> ChannelOp {
        match self {
            Strategy::Scrape | Strategy::ScrapeRetry | Strategy::QuotaScrape => ChannelOp::Scrape,
            Strategy::ChannelLookup => ChannelOp::ChannelLookup,
            Strategy::Search => ChannelOp::Search,
        }
    }

    pub fn source(self) -> IdSource {
        match self.operation() {
            ChannelOp::Scrape => IdSource::Scraped,
            ChannelOp::ChannelLookup | ChannelOp::Search => IdSource::Api,
        }
    }

    /// The strategy after this one in the regular ordering.
    fn successor(self) -> Option<Strategy> {
        let pos = CHANNEL_STRATEGIES.iter().position(|s| *s == self)?;
        CHANNEL_STRATEGIES.get(pos + 1).copied()
    }

    /// Decide the next move from this strategy's outcome.
    ///
    /// A quota signal only diverts `ChannelLookup`; everywhere else it
    /// counts as an empty result. `QuotaScrape` never falls through to
    /// the remaining API strategies, which share the exhausted quota.
    pub fn on_outcome(self, outcome: ChannelOutcome) -> Verdict {
        match (self, outcome) {
            (_, ChannelOutcome::Found(id)) => Verdict::Accept(id, self.source()),
            (Strategy::ChannelLookup, ChannelOutcome::QuotaExceeded) => {
                Verdict::Next(Strategy::QuotaScrape)
            }
            (Strategy::QuotaScrape, _) => Verdict::Exhausted,
            (_, ChannelOutcome::Nothing | ChannelOutcome::QuotaExceeded) => {
                match self.successor() {
                    Some(next) => Verdict::Next(next),
                    None => Verdict::Exhausted,
                }
            }
        }
    }
}
