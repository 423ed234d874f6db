use async_trait::async_trait;
use omnistream_core::{Platform, UploadState, VideoMetadata};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use super::{require_credential, UploadContext, UploadStrategy};
use crate::http::{endpoint, map_reqwest_error, ApiClient};
use crate::{HttpSettings, JobRun, UploadError};

const TOKEN_HEADER: &str = "access-token";

/// Douyin open platform: init, single multipart part, complete, create post.
#[derive(Debug, Clone)]
pub(crate) struct DouyinUpload {
    base_url: String,
    http: HttpSettings,
}

/// Douyin wraps every payload in `{"data": {"error_code": .., "description": .., ...}}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Data<T>,
}

#[derive(Debug, Deserialize)]
struct Data<T> {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    description: String,
    #[serde(flatten)]
    body: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitBody {
    upload_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartBody {
    #[serde(default)]
    #[allow(dead_code)]
    crc32: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompleteBody {
    video: VideoRef,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    video_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct CreateBody {
    #[serde(default)]
    item_id: Option<String>,
}

impl DouyinUpload {
    pub(crate) fn new(base_url: impl Into<String>, http: HttpSettings) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        client: &ApiClient,
        request: reqwest::RequestBuilder,
        step: &str,
    ) -> Result<T, UploadError> {
        let envelope: Envelope<T> = client.send_json(request).await?;
        let data = envelope.data;
        if data.error_code != 0 {
            return Err(UploadError::api(
                Platform::Douyin,
                None,
                format!("{step} failed ({}): {}", data.error_code, data.description),
            ));
        }
        data.body.ok_or_else(|| {
            UploadError::Unexpected(format!("Douyin {step} response is missing its payload"))
        })
    }
}

/// Title and description on separate lines, then the tags as hashtags.
fn post_text(metadata: &VideoMetadata) -> String {
    let mut text = format!("{}\n{}", metadata.title, metadata.description);
    if !metadata.tags.is_empty() {
        let hashtags: Vec<String> = metadata.tags.iter().map(|tag| format!("#{tag}")).collect();
        text.push('\n');
        text.push_str(&hashtags.join(" "));
    }
    text
}

#[async_trait]
impl UploadStrategy for DouyinUpload {
    async fn upload(&self, run: &mut JobRun, ctx: &UploadContext<'_>) -> Result<(), UploadError> {
        let token = require_credential(ctx)?;
        let client = ApiClient::build(Platform::Douyin, &self.http)?;
        let http = client.inner();

        run.info("POST /video/upload/init/ ...");
        let init: InitBody = self
            .call(
                &client,
                http.post(endpoint(&self.base_url, "/video/upload/init/", &[])?)
                    .header(TOKEN_HEADER, token)
                    .json(&json!({})),
                "upload init",
            )
            .await?;
        run.info(format!("Upload initialized. ID: {}", init.upload_id));
        run.set_state(UploadState::Uploading);
        run.set_progress(10);

        run.info(format!(
            "Uploading video data ({:.2}MB)...",
            ctx.asset.size_mb()
        ));
        run.set_progress(20);
        let part = Part::stream_with_length(ctx.asset.data().clone(), ctx.asset.len() as u64)
            .file_name(ctx.asset.file_name().to_string())
            .mime_str(ctx.asset.content_type())
            .map_err(map_reqwest_error)?;
        let part_url = endpoint(
            &self.base_url,
            "/video/upload/part/",
            &[("upload_id", init.upload_id.as_str()), ("part_number", "1")],
        )?;
        let _: PartBody = self
            .call(
                &client,
                http.post(part_url)
                    .header(TOKEN_HEADER, token)
                    .multipart(Form::new().part("video", part)),
                "upload part",
            )
            .await?;
        run.info("Video part uploaded.");
        run.set_progress(80);

        let complete_url = endpoint(
            &self.base_url,
            "/video/upload/complete/",
            &[("upload_id", init.upload_id.as_str())],
        )?;
        let complete: CompleteBody = self
            .call(
                &client,
                http.post(complete_url).header(TOKEN_HEADER, token),
                "upload complete",
            )
            .await?;
        run.set_progress(90);

        run.info("Creating video post...");
        run.set_state(UploadState::Processing);
        let text = post_text(ctx.metadata);
        let created: CreateBody = self
            .call(
                &client,
                http.post(endpoint(&self.base_url, "/video/create/", &[])?)
                    .header(TOKEN_HEADER, token)
                    .json(&json!({ "video_id": complete.video.video_id, "text": text })),
                "video create",
            )
            .await?;

        let locator = created
            .item_id
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.douyin.com/video/{id}"));
        run.complete("Douyin video published successfully!", locator);
        Ok(())
    }
}
