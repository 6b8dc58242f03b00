//! Client-agent screening ahead of rate limiting.
//!
//! Verified crawlers and ad-verification agents are allow-listed first; the
//! deny patterns only apply when no allow pattern matched, so the allow-list
//! always wins.

/// Crawlers and ad-verification agents that must never be blocked.
pub const ALLOWED_BOTS: [&str; 8] = [
    "googlebot",
    "google-ads",
    "adsbot-google",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "bingbot",
    "slurp",
];

pub fn is_blocked_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();

    if ALLOWED_BOTS.iter().any(|bot| ua.contains(bot)) {
        return false;
    }

    ua.contains("crawler")
        || ua.contains("spider")
        || (ua.contains("bot") && !ua.contains("googlebot"))
}
