use std::sync::LazyLock;

use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;
use serde::Deserialize;

use crate::Segment;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcripts are disabled for video {video_id}")]
    Disabled { video_id: String },

    #[error("no transcript found for video {video_id} in {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("could not extract InnerTube API key from watch page")]
    MissingApiKey,

    #[error("transcript request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("error parsing caption XML: {0}")]
    Parse(String),
}

/// One transcript track available for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub name: String,
    pub base_url: String,
    pub is_generated: bool,
}

#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every transcript track available for a video
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError>;

    /// Download and parse a single track
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<Segment>, TranscriptError>;

    /// Fetch the first track matching `languages`, in priority order
    async fn fetch(&self, video_id: &str, languages: &[&str]) -> Result<Vec<Segment>, TranscriptError> {
        let tracks = self.list_tracks(video_id).await?;
        let track = find_track(video_id, &tracks, languages)?;
        debug!(
            "Using caption track: video={video_id} lang={} generated={}",
            track.language_code, track.is_generated
        );
        self.fetch_track(track).await
    }
}

/// Pick a track for the first language in `languages` that has one.
/// Manually created tracks win over auto-generated ones.
pub fn find_track<'a>(
    video_id: &str,
    tracks: &'a [CaptionTrack],
    languages: &[&str],
) -> Result<&'a CaptionTrack, TranscriptError> {
    for lang in languages {
        let matching = |t: &&CaptionTrack| t.language_code == *lang;
        if let Some(track) = tracks
            .iter()
            .filter(matching)
            .find(|t| !t.is_generated)
            .or_else(|| tracks.iter().find(matching))
        {
            return Ok(track);
        }
    }

    Err(TranscriptError::NoTranscriptFound {
        video_id: video_id.to_string(),
        requested: languages.iter().map(|l| l.to_string()).collect(),
        available: tracks.iter().map(|t| t.language_code.clone()).collect(),
    })
}

/// Fetch a transcript in `primary`, falling back to `fallback` once.
///
/// Disabled transcripts are never retried. When the fallback fails too the
/// primary error is returned, since it describes the path the caller asked for.
pub async fn fetch_with_fallback(
    provider: &dyn TranscriptProvider,
    video_id: &str,
    primary: &str,
    fallback: &str,
) -> Result<Vec<Segment>, TranscriptError> {
    let primary_err = match provider.fetch(video_id, &[primary]).await {
        Ok(segments) => return Ok(segments),
        Err(e @ TranscriptError::Disabled { .. }) => return Err(e),
        Err(e) => e,
    };

    warn!("No '{primary}' transcript for {video_id} ({primary_err}), trying '{fallback}'");

    match provider.fetch(video_id, &[fallback]).await {
        Ok(segments) => {
            info!("Using '{fallback}' transcript for {video_id}");
            Ok(segments)
        }
        Err(fallback_err) => {
            warn!("Fallback '{fallback}' transcript failed for {video_id}: {fallback_err}");
            Err(primary_err)
        }
    }
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<RawCaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct RawCaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl From<RawCaptionTrack> for CaptionTrack {
    fn from(raw: RawCaptionTrack) -> Self {
        let name = raw
            .name
            .and_then(|n| {
                n.simple_text
                    .or_else(|| n.runs.map(|runs| runs.into_iter().map(|r| r.text).collect::<String>()))
            })
            .unwrap_or_else(|| raw.language_code.clone());

        CaptionTrack {
            language_code: raw.language_code,
            name,
            // srv3 is a different XML dialect than the <text> format parsed below
            base_url: raw.base_url.replace("&fmt=srv3", ""),
            is_generated: raw.kind.as_deref() == Some("asr"),
        }
    }
}

/// Transcript provider backed by YouTube's built-in captions via the InnerTube API
#[derive(Debug, Clone)]
pub struct InnerTubeClient {
    client: reqwest::Client,
}

impl InnerTubeClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptProvider for InnerTubeClient {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html).ok_or(TranscriptError::MissingApiKey)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracks_from_player_response(video_id, resp)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<Segment>, TranscriptError> {
        debug!("Fetching caption track: lang={}", track.language_code);

        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

fn tracks_from_player_response(
    video_id: &str,
    resp: InnerTubePlayerResponse,
) -> Result<Vec<CaptionTrack>, TranscriptError> {
    if let Some(status) = resp.playability_status {
        let state = status.status.unwrap_or_default();
        if !state.is_empty() && state != "OK" {
            return Err(TranscriptError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: status.reason.unwrap_or(state),
            });
        }
    }

    let tracks: Vec<CaptionTrack> = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(CaptionTrack::from)
        .collect();

    if tracks.is_empty() {
        return Err(TranscriptError::Disabled {
            video_id: video_id.to_string(),
        });
    }

    Ok(tracks)
}

static API_KEY_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).unwrap(),
        // Fallback: the newer pattern
        Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).unwrap(),
    ]
});

fn extract_api_key(html: &str) -> Option<String> {
    API_KEY_PATTERNS
        .iter()
        .find_map(|re| re.captures(html))
        .map(|caps| caps[1].to_string())
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>, TranscriptError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                // Some tracks omit dur on the final cue
                current_dur = Some(0.0);
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"start" => current_start = value.parse::<f64>().ok(),
                        b"dur" => current_dur = value.parse::<f64>().ok(),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                // An empty cue must not capture the whitespace after it
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(duration)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TranscriptError::Parse(e.to_string())),
            _ => {}
        }
    }

    Ok(segments)
}
