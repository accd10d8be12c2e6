// src/youtube.rs
// Video id extraction for source previews

use regex::Regex;
use std::sync::OnceLock;

const VIDEO_ID_LEN: usize = 11;

/// The 11-character video id in a YouTube link, if one can be found.
pub fn video_id(url: &str) -> Option<String> {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = ID_RE.get_or_init(|| {
        Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
            .expect("valid youtube id regex")
    });

    let caps = re.captures(url.trim())?;
    let id = caps.get(2)?.as_str();
    (id.len() == VIDEO_ID_LEN).then(|| id.to_string())
}

pub fn embed_url(url: &str) -> Option<String> {
    video_id(url).map(|id| format!("https://www.youtube.com/embed/{}", id))
}
