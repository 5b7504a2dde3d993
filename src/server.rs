use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use log::{error, info, warn};
use serde::Deserialize;

use crate::compose::SummaryResponse;
use crate::pipeline::{Pipeline, PipelineError};

#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl SummarizeRequest {
    /// Anything that is not a JSON object with a string `url` counts as no URL
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let status = match e {
            PipelineError::MissingUrl | PipelineError::InvalidUrl | PipelineError::TranscriptDisabled => {
                StatusCode::BAD_REQUEST
            }
            PipelineError::Transcript(_) | PipelineError::Summary(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/api/summarize", post(summarize_video))
        .fallback(not_found)
        .with_state(pipeline)
}

async fn summarize_video(State(pipeline): State<Pipeline>, body: Bytes) -> ApiResult<Json<SummaryResponse>> {
    let request = SummarizeRequest::from_body(&body);

    match pipeline.run(request.url.as_deref()).await {
        Ok(response) => {
            info!(
                "Summarized {} words into {} key points",
                response.word_count,
                response.key_points.len()
            );
            Ok(Json(response))
        }
        Err(e) => {
            let err = ApiError::from(e);
            if err.status.is_server_error() {
                error!("{}", err.message);
            } else {
                warn!("Rejected request: {}", err.message);
            }
            Err(err)
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("endpoint not found")
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::metadata::VideoInfo;
    use crate::pipeline::test_support::*;

    async fn post_json(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(
                Request::post("/api/summarize")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn app(transcripts: StaticTranscripts, summarizer: CannedSummarizer, metadata: CannedMetadata) -> Router {
        let (pipeline, _, _) = pipeline(transcripts, summarizer, metadata);
        router(pipeline)
    }

    fn default_app() -> Router {
        app(
            StaticTranscripts::with_text("one two three four"),
            CannedSummarizer::replying("Intro line.\n- point one\n- point two"),
            CannedMetadata(None),
        )
    }

    #[tokio::test]
    async fn test_success_payload() {
        let info = VideoInfo {
            title: Some("Title".to_string()),
            channel: Some("Channel".to_string()),
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
        };
        let app = app(
            StaticTranscripts::with_text("one two three four"),
            CannedSummarizer::replying("Intro line.\n- point one\n- point two"),
            CannedMetadata(Some(info)),
        );

        let (status, json) = post_json(app, r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["transcript"], "one two three four [en]");
        assert_eq!(json["summary"], "Intro line.");
        assert_eq!(json["keyPoints"], serde_json::json!(["point one", "point two"]));
        assert_eq!(json["tags"], serde_json::json!(["AI", "Gemini", "YouTube", "Summary"]));
        assert_eq!(json["wordCount"], 5);
        assert_eq!(json["readingTime"], 0.0);
        assert_eq!(
            json["videoInfo"],
            serde_json::json!({"title": "Title", "channel": "Channel", "publishedAt": "2024-01-01T00:00:00Z"})
        );
    }

    #[tokio::test]
    async fn test_missing_metadata_key_yields_empty_video_info() {
        let (status, json) = post_json(default_app(), r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["videoInfo"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_no_url() {
        for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": null}"#, "not json", ""] {
            let (status, json) = post_json(default_app(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, serde_json::json!({"error": "No URL provided"}));
        }
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let (status, json) = post_json(default_app(), r#"{"url": "https://vimeo.com/12345"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({"error": "Invalid YouTube URL"}));
    }

    #[tokio::test]
    async fn test_transcript_disabled() {
        let mut transcripts = StaticTranscripts::with_text("x");
        transcripts.disabled = true;
        let app = app(transcripts, CannedSummarizer::replying("s"), CannedMetadata(None));

        let (status, json) = post_json(app, r#"{"url": "https://www.youtube.com/embed/dQw4w9WgXcQ"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({"error": "Transcript disabled for this video"}));
    }

    #[tokio::test]
    async fn test_no_transcript_is_server_error() {
        let mut transcripts = StaticTranscripts::with_text("x");
        transcripts.langs = vec![];
        let app = app(transcripts, CannedSummarizer::replying("s"), CannedMetadata(None));

        let (status, json) = post_json(app, r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to generate summary: no transcript found")
        );
    }

    #[tokio::test]
    async fn test_summarizer_failure_message() {
        let app = app(
            StaticTranscripts::with_text("x"),
            CannedSummarizer::failing(),
            CannedMetadata(None),
        );
        let (status, json) = post_json(app, r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            serde_json::json!({"error": "Failed to generate summary: Unexpected API response."})
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let resp = default_app()
            .oneshot(Request::get("/api/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
