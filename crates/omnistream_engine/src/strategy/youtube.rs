use async_trait::async_trait;
use omnistream_core::{Platform, UploadState};
use reqwest::header::{HeaderValue, CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::{require_credential, UploadContext, UploadStrategy};
use crate::http::{endpoint, ApiClient};
use crate::{HttpSettings, JobRun, UploadError};

/// YouTube Data API resumable upload: open a session, then PUT the payload
/// in chunks until the server answers with the created video.
#[derive(Debug, Clone)]
pub(crate) struct YouTubeUpload {
    base_url: String,
    http: HttpSettings,
    chunk_size: usize,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
}

impl YouTubeUpload {
    pub(crate) fn new(base_url: impl Into<String>, http: HttpSettings, chunk_size: usize) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            chunk_size: chunk_size.max(1),
        }
    }

    async fn open_session(
        &self,
        client: &ApiClient,
        token: &str,
        ctx: &UploadContext<'_>,
    ) -> Result<Url, UploadError> {
        let url = endpoint(
            &self.base_url,
            "/upload/youtube/v3/videos",
            &[("uploadType", "resumable"), ("part", "snippet,status")],
        )?;
        let body = json!({
            "snippet": {
                "title": ctx.metadata.title,
                "description": ctx.metadata.description,
                "tags": ctx.metadata.tags,
                "categoryId": "22",
            },
            "status": { "privacyStatus": "private" },
        });
        let response = client
            .send(
                client
                    .inner()
                    .post(url.clone())
                    .bearer_auth(token)
                    .header("X-Upload-Content-Length", ctx.asset.len().to_string())
                    .header("X-Upload-Content-Type", ctx.asset.content_type())
                    .json(&body),
            )
            .await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                UploadError::api(
                    client.platform(),
                    Some(response.status().as_u16()),
                    "Failed to get YouTube upload location",
                )
            })?;
        url.join(location)
            .map_err(|err| UploadError::Unexpected(format!("invalid upload location: {err}")))
    }
}

#[async_trait]
impl UploadStrategy for YouTubeUpload {
    async fn upload(&self, run: &mut JobRun, ctx: &UploadContext<'_>) -> Result<(), UploadError> {
        let token = require_credential(ctx)?;
        let client = ApiClient::build(Platform::YouTube, &self.http)?;

        run.info("Initiating resumable upload session...");
        run.set_state(UploadState::Uploading);
        let session = self.open_session(&client, token, ctx).await?;
        run.info("Session created. Starting binary upload...");
        run.set_progress(10);

        let data = ctx.asset.data();
        let total = data.len();
        let mut sent = 0usize;
        let video = loop {
            let end = (sent + self.chunk_size).min(total);
            let response = client
                .execute(
                    client
                        .inner()
                        .put(session.clone())
                        .bearer_auth(token)
                        .header(CONTENT_TYPE, ctx.asset.content_type())
                        .header(
                            CONTENT_RANGE,
                            format!("bytes {}-{}/{}", sent, end - 1, total),
                        )
                        .body(data.slice(sent..end)),
                )
                .await?;

            let status = response.status();
            if status == StatusCode::PERMANENT_REDIRECT {
                let confirmed = persisted_bytes(response.headers().get(RANGE));
                if confirmed <= sent {
                    return Err(UploadError::api(
                        client.platform(),
                        Some(status.as_u16()),
                        format!("server persisted no new data (resume offset {confirmed})"),
                    ));
                }
                sent = confirmed.min(total);
                if sent >= total {
                    return Err(UploadError::api(
                        client.platform(),
                        Some(status.as_u16()),
                        "server still expects data after the last chunk",
                    ));
                }
                run.set_progress(transfer_progress(sent, total));
                continue;
            }

            let response = client.ensure_success(response).await?;
            break client.json::<VideoResource>(response).await?;
        };

        run.set_progress(90);
        run.set_state(UploadState::Processing);
        run.complete(
            format!("YouTube upload complete! ID: {}", video.id),
            Some(format!("https://youtu.be/{}", video.id)),
        );
        Ok(())
    }
}

/// Number of bytes the server holds, from a `Range: bytes=0-N` header.
/// A missing or unreadable header means nothing was persisted.
fn persisted_bytes(range: Option<&HeaderValue>) -> usize {
    range
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().strip_prefix("bytes="))
        .and_then(|span| span.split('-').nth(1))
        .and_then(|last| last.trim().parse::<usize>().ok())
        .map_or(0, |last| last + 1)
}

/// Transfer runs from 10% to 90%.
fn transfer_progress(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 90;
    }
    (10 + sent as u64 * 80 / total as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_bytes_reads_last_confirmed_offset() {
        let header = HeaderValue::from_static("bytes=0-99999");
        assert_eq!(persisted_bytes(Some(&header)), 100_000);
        assert_eq!(persisted_bytes(None), 0);
        let garbage = HeaderValue::from_static("items=3");
        assert_eq!(persisted_bytes(Some(&garbage)), 0);
    }

    #[test]
    fn transfer_progress_spans_session_to_finalize() {
        assert_eq!(transfer_progress(0, 100), 10);
        assert_eq!(transfer_progress(50, 100), 50);
        assert_eq!(transfer_progress(100, 100), 90);
    }
}
