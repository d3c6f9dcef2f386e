//! Automated-traffic detection
//!
//! Keyword tables over the lowercased header. Matching is substring based;
//! the generic `bot` token additionally requires a delimiter after it, and
//! handset models such as `CUBOT_X19` are exempted.

use super::tokens::UserAgent;

/// Substrings that identify crawlers, HTTP libraries, previewers and monitors
const BOT_KEYWORDS: &[&str] = &[
    "crawler",
    "crawling",
    "spider",
    "slurp",
    "scrapy",
    "headless",
    "phantomjs",
    "lighthouse",
    "pagespeed",
    "facebookexternalhit",
    "mediapartners-google",
    "feedfetcher",
    "bingpreview",
    "google-read-aloud",
    "pingdom",
    "uptimerobot",
    "statuscake",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "curl/",
    "wget/",
    "go-http-client",
    "java/",
    "okhttp",
    "apache-httpclient",
    "libwww-perl",
    "axios/",
    "node-fetch",
    "postmanruntime",
    "insomnia/",
];

/// Characters that may follow a generic `bot` token (`Googlebot/2.1`, `Slackbot-LinkExpanding`)
const BOT_SUFFIXES: &[char] = &['/', ';', ')', '-', '_', ' ', '+'];

pub fn is_bot(ua: &UserAgent<'_>) -> bool {
    let lower = ua.lower();

    if BOT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    lower.match_indices("bot").any(|(idx, m)| {
        match lower[idx + m.len()..].chars().next() {
            None => true,
            // CUBOT handsets: "CUBOT_X19", "CUBOT X19"
            Some(' ' | '_') if lower[..idx].ends_with("cu") => false,
            Some(c) => BOT_SUFFIXES.contains(&c),
        }
    })
}
