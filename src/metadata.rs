use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Snippet fields surfaced in the response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub channel: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("YT_API_KEY is not set")]
    MissingApiKey,

    #[error("no video info found for {0}")]
    NotFound(String),

    #[error("YouTube Data API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn video_info(&self, video_id: &str) -> Result<VideoInfo, MetadataError>;
}

/// Look up metadata, degrading any failure to `None`
pub async fn video_info_or_empty(provider: &dyn MetadataProvider, video_id: &str) -> Option<VideoInfo> {
    match provider.video_info(video_id).await {
        Ok(info) => Some(info),
        Err(MetadataError::MissingApiKey) => {
            warn!("YouTube Data API key not configured, skipping video info for {video_id}");
            None
        }
        Err(e) => {
            warn!("Error fetching video info for {video_id}: {e}");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

impl From<Snippet> for VideoInfo {
    fn from(snippet: Snippet) -> Self {
        VideoInfo {
            title: snippet.title,
            channel: snippet.channel_title,
            published_at: snippet.published_at,
        }
    }
}

/// YouTube Data API v3 client
#[derive(Debug, Clone)]
pub struct YouTubeDataClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl YouTubeDataClient {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl MetadataProvider for YouTubeDataClient {
    async fn video_info(&self, video_id: &str) -> Result<VideoInfo, MetadataError> {
        let api_key = self.api_key.as_deref().ok_or(MetadataError::MissingApiKey)?;
        debug!("Fetching video info for {video_id}");

        let resp: VideoListResponse = self
            .client
            .get(VIDEOS_URL)
            .query(&[("part", "snippet"), ("id", video_id), ("key", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        first_snippet(video_id, resp)
    }
}

fn first_snippet(video_id: &str, resp: VideoListResponse) -> Result<VideoInfo, MetadataError> {
    resp.items
        .into_iter()
        .next()
        .and_then(|item| item.snippet)
        .map(VideoInfo::from)
        .ok_or_else(|| MetadataError::NotFound(video_id.to_string()))
}
