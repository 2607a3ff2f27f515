//! Recognizes YouTube links so they can be turned away before any lookup.

use url::Url;

/// Hosts serving YouTube pages and short links.
const YOUTUBE_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

pub struct YoutubeApi;

impl YoutubeApi {
    /// Checks if the input string is a YouTube URL (watch page, shorts, playlist or youtu.be).
    /// Scheme and host are compared case-insensitively and any port is ignored.
    pub fn is_youtube_url(query: &str) -> bool {
        let query = query.trim();

        // Links are often pasted without a scheme.
        let parsed = if query.contains("://") {
            Url::parse(query)
        } else if let Some(rest) = query.strip_prefix("//") {
            Url::parse(&format!("https://{}", rest))
        } else {
            Url::parse(&format!("https://{}", query))
        };

        match parsed {
            Ok(url) => {
                matches!(url.scheme(), "http" | "https")
                    && url
                        .host_str()
                        .is_some_and(|host| YOUTUBE_HOSTS.contains(&host))
            }
            Err(_) => false,
        }
    }
}
