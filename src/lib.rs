pub mod compose;
pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod server;
pub mod summarize;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

// Order matters: the first pattern that matches wins.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // youtube.com/watch?v=ID
        Regex::new(r"v=([0-9A-Za-z_-]{11})").unwrap(),
        // youtu.be/ID
        Regex::new(r"youtu\.be/([0-9A-Za-z_-]{11})").unwrap(),
        // youtube.com/embed/ID
        Regex::new(r"embed/([0-9A-Za-z_-]{11})").unwrap(),
    ]
});

/// Extract the 11-character video ID from a watch, short-link or embed URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Join segment texts into one space-separated string
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some(ID.to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=120"),
            Some(ID.to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), Some(ID.to_string()));
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some(ID.to_string())
        );
    }

    #[test]
    fn test_all_shapes_agree() {
        let urls = [
            format!("https://www.youtube.com/watch?v={ID}"),
            format!("https://youtu.be/{ID}?si=abc"),
            format!("https://www.youtube-nocookie.com/embed/{ID}"),
        ];
        for url in &urls {
            assert_eq!(extract_video_id(url).as_deref(), Some(ID), "{url}");
        }
    }

    #[test]
    fn test_pattern_order() {
        // v= wins over embed/ when both are present
        assert_eq!(
            extract_video_id("https://example.com/embed/AAAAAAAAAAA?v=BBBBBBBBBBB"),
            Some("BBBBBBBBBBB".to_string())
        );
    }

    #[test]
    fn test_short_id_rejected() {
        assert_eq!(extract_video_id("https://youtu.be/abc123"), None);
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id(ID), None);
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not-a-valid-url"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_join_segments() {
        let segments = vec![
            Segment {
                text: "Hello world".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            Segment {
                text: "This is a test".to_string(),
                start: 1.5,
                duration: 2.0,
            },
        ];
        assert_eq!(join_segments(&segments), "Hello world This is a test");
        assert_eq!(join_segments(&[]), "");
    }
}
