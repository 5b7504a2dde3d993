use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::metadata::VideoInfo;

pub const TAGS: [&str; 4] = ["AI", "Gemini", "YouTube", "Summary"];

static BULLET_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-\x{2022}]\s+").unwrap());

/// Where the line scanner is in the summary text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Prose,
    Bullets,
}

/// Summary text split into its prose lead and bullet list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySections {
    pub summary: String,
    pub key_points: Vec<String>,
}

/// Split generated text at the first bullet line.
///
/// Once a bullet is seen every later line belongs to the bullet list, even
/// lines without a bullet prefix.
pub fn split_summary(text: &str) -> SummarySections {
    let mut section = Section::Prose;
    let mut prose = Vec::new();
    let mut key_points = Vec::new();

    for line in text.split('\n') {
        if section == Section::Prose && BULLET_PREFIX.is_match(line) {
            section = Section::Bullets;
        }
        match section {
            Section::Prose => prose.push(line),
            Section::Bullets => {
                let point = strip_bullet(line);
                if !point.is_empty() {
                    key_points.push(point.to_string());
                }
            }
        }
    }

    SummarySections {
        summary: prose.join(" ").trim().to_string(),
        key_points,
    }
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '\u{2022}', ' ']).trim()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read `words`, rounded to one decimal place
pub fn reading_time(words: usize, words_per_minute: u32) -> f64 {
    if words_per_minute == 0 {
        return 0.0;
    }
    let minutes = words as f64 / f64::from(words_per_minute);
    // Decimal formatting rounds on the exact binary value: 1.25 -> 1.2, 0.15 -> 0.1
    format!("{minutes:.1}").parse().unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub transcript: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub tags: Vec<String>,
    pub word_count: usize,
    pub reading_time: f64,
    #[serde(serialize_with = "video_info_or_empty_map")]
    pub video_info: Option<VideoInfo>,
}

fn video_info_or_empty_map<S: Serializer>(info: &Option<VideoInfo>, serializer: S) -> Result<S::Ok, S::Error> {
    match info {
        Some(info) => info.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Assemble the response body from the trimmed transcript and generated text
pub fn compose(
    transcript: &str,
    generated: &str,
    video_info: Option<VideoInfo>,
    words_per_minute: u32,
) -> SummaryResponse {
    let SummarySections { summary, key_points } = split_summary(generated);
    let words = word_count(transcript);

    SummaryResponse {
        transcript: transcript.to_string(),
        summary,
        key_points,
        tags: TAGS.iter().map(|t| t.to_string()).collect(),
        word_count: words,
        reading_time: reading_time(words, words_per_minute),
        video_info,
    }
}
