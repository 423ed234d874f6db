use omnistream_core::Platform;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{HttpSettings, UploadError};

/// HTTP client bound to one platform, so failures carry the platform name.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    platform: Platform,
    client: reqwest::Client,
}

impl ApiClient {
    pub(crate) fn build(platform: Platform, settings: &HttpSettings) -> Result<Self, UploadError> {
        // Resumable sessions answer 308 with a Range header; it must reach the caller.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { platform, client })
    }

    pub(crate) fn platform(&self) -> Platform {
        self.platform
    }

    pub(crate) fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Sends the request, mapping only transport failures. Any status is returned.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response, UploadError> {
        request.send().await.map_err(map_reqwest_error)
    }

    /// Sends the request and requires a 2xx status.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, UploadError> {
        let response = self.execute(request).await?;
        self.ensure_success(response).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, UploadError> {
        let response = self.send(request).await?;
        self.json(response).await
    }

    pub(crate) async fn ensure_success(&self, response: Response) -> Result<Response, UploadError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(self.status_error(status.as_u16(), &body))
    }

    pub(crate) fn status_error(&self, status: u16, body: &str) -> UploadError {
        let excerpt: String = body.chars().take(100).collect();
        UploadError::api(self.platform, Some(status), format!("HTTP {status}: {excerpt}"))
    }

    pub(crate) async fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T, UploadError> {
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            UploadError::Unexpected(format!("malformed {} response: {err}", self.platform))
        })
    }
}

/// Joins `path` onto `base` and appends query pairs.
pub(crate) fn endpoint(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url, UploadError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    let mut url = Url::parse(&raw)
        .map_err(|err| UploadError::Unexpected(format!("invalid endpoint {raw}: {err}")))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::transport(format!("request timed out: {err}"));
    }
    if err.is_connect() {
        return UploadError::transport(format!("could not connect: {err}"));
    }
    UploadError::transport(err.to_string())
}
