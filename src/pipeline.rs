use std::sync::Arc;

use log::{debug, info};

use crate::compose::{SummaryResponse, compose};
use crate::config::Config;
use crate::metadata::{MetadataProvider, video_info_or_empty};
use crate::summarize::{SummaryError, Summarizer, trim_to_char_limit};
use crate::youtube::{TranscriptError, TranscriptProvider, fetch_with_fallback};
use crate::{extract_video_id, join_segments};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No URL provided")]
    MissingUrl,

    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Transcript disabled for this video")]
    TranscriptDisabled,

    #[error("Failed to generate summary: {0}")]
    Transcript(#[source] TranscriptError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

impl From<TranscriptError> for PipelineError {
    fn from(e: TranscriptError) -> Self {
        match e {
            TranscriptError::Disabled { .. } => PipelineError::TranscriptDisabled,
            other => PipelineError::Transcript(other),
        }
    }
}

/// Knobs the pipeline reads per request
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub primary_lang: String,
    pub fallback_lang: String,
    pub max_transcript_chars: usize,
    pub words_per_minute: u32,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            primary_lang: config.primary_lang.clone(),
            fallback_lang: config.fallback_lang.clone(),
            max_transcript_chars: config.max_transcript_chars,
            words_per_minute: config.words_per_minute,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings::from(&Config::default())
    }
}

/// URL in, summary out. Holds the upstream clients built at startup.
#[derive(Clone)]
pub struct Pipeline {
    transcripts: Arc<dyn TranscriptProvider>,
    summarizer: Arc<dyn Summarizer>,
    metadata: Arc<dyn MetadataProvider>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        transcripts: Arc<dyn TranscriptProvider>,
        summarizer: Arc<dyn Summarizer>,
        metadata: Arc<dyn MetadataProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            transcripts,
            summarizer,
            metadata,
            settings,
        }
    }

    pub async fn run(&self, url: Option<&str>) -> Result<SummaryResponse, PipelineError> {
        let url = url.filter(|u| !u.is_empty()).ok_or(PipelineError::MissingUrl)?;
        let video_id = extract_video_id(url).ok_or(PipelineError::InvalidUrl)?;
        info!("Summarizing video {video_id}");

        let segments = fetch_with_fallback(
            self.transcripts.as_ref(),
            &video_id,
            &self.settings.primary_lang,
            &self.settings.fallback_lang,
        )
        .await?;

        let full_text = join_segments(&segments);
        let trimmed = trim_to_char_limit(&full_text, self.settings.max_transcript_chars);
        debug!(
            "Transcript for {video_id}: {} segments, {} chars (sending {})",
            segments.len(),
            full_text.chars().count(),
            trimmed.chars().count()
        );

        let generated = self.summarizer.summarize(trimmed).await?;
        let video_info = video_info_or_empty(self.metadata.as_ref(), &video_id).await;

        Ok(compose(trimmed, &generated, video_info, self.settings.words_per_minute))
    }
}
