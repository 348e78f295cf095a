//! GigaChat transport trait and reqwest-based HTTP implementation.

use std::collections::VecDeque;
use std::fmt::Formatter;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use gcommon::MetadataMap;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::{CompletionRequest, CompletionResponse, FileUpload, ProviderError, UploadedFile};

/// Correlation header forwarded to the completion API untouched.
pub const X_SESSION_ID_HEADER: &str = "X-Session-ID";

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type CompletionChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<CompletionResponse, ProviderError>> + Send + 'a>>;

/// The remote completion API as the orchestration layer consumes it: one
/// blocking completion call, one streaming call, and the file-upload call.
///
/// A `None` completion result models an empty response body; callers treat
/// it as zero results rather than an error. Transport-level failures map to
/// [`ProviderError`] and propagate unchanged; no retry happens here.
pub trait GigaChatTransport: Send + Sync + std::fmt::Debug {
    fn chat_completion<'a>(
        &'a self,
        request: CompletionRequest,
        headers: MetadataMap,
    ) -> ProviderFuture<'a, Result<Option<CompletionResponse>, ProviderError>>;

    fn chat_completion_stream<'a>(
        &'a self,
        request: CompletionRequest,
        headers: MetadataMap,
    ) -> ProviderFuture<'a, Result<CompletionChunkStream<'a>, ProviderError>>;

    fn upload_file<'a>(
        &'a self,
        upload: FileUpload,
    ) -> ProviderFuture<'a, Result<UploadedFile, ProviderError>>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct GigaChatAuth {
    token: String,
}

impl GigaChatAuth {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for GigaChatAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("GigaChatAuth::Bearer([REDACTED])")
    }
}

#[derive(Debug, Clone)]
pub struct GigaChatHttpTransport {
    client: Client,
    auth: GigaChatAuth,
    base_url: String,
}

impl GigaChatHttpTransport {
    pub fn new(client: Client, auth: GigaChatAuth) -> Self {
        Self {
            client,
            auth,
            base_url: "https://gigachat.devices.sberbank.ru/api/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &MetadataMap,
    ) -> reqwest::RequestBuilder {
        headers.iter().fold(builder, |builder, (name, value)| {
            builder.header(name.as_str(), value.as_str())
        })
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("GigaChat request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

impl GigaChatTransport for GigaChatHttpTransport {
    fn chat_completion<'a>(
        &'a self,
        request: CompletionRequest,
        headers: MetadataMap,
    ) -> ProviderFuture<'a, Result<Option<CompletionResponse>, ProviderError>> {
        Box::pin(async move {
            let url = self.endpoint("chat/completions");
            let builder = self
                .client
                .post(url)
                .bearer_auth(self.auth.token())
                .json(&request);
            let response = Self::apply_headers(builder, &headers)
                .send()
                .await
                .map_err(classify_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let body = response
                .text()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            if body.trim().is_empty() {
                tracing::debug!(event = "empty_completion_body", "completion response body was empty");
                return Ok(None);
            }

            let parsed = serde_json::from_str::<CompletionResponse>(&body)
                .map_err(|err| ProviderError::protocol(err.to_string()))?;
            Ok(Some(parsed))
        })
    }

    fn chat_completion_stream<'a>(
        &'a self,
        mut request: CompletionRequest,
        headers: MetadataMap,
    ) -> ProviderFuture<'a, Result<CompletionChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let url = self.endpoint("chat/completions");
            let builder = self
                .client
                .post(url)
                .bearer_auth(self.auth.token())
                .json(&request);
            let response = Self::apply_headers(builder, &headers)
                .send()
                .await
                .map_err(classify_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let mut bytes = response.bytes_stream();
            let stream = try_stream! {
                let mut buffer = SseBuffer::default();
                let mut finished = false;

                while let Some(item) = bytes.next().await {
                    let chunk = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    for payload in buffer.push(&chunk)? {
                        if payload == "[DONE]" {
                            finished = true;
                            break;
                        }

                        let parsed = serde_json::from_str::<CompletionResponse>(&payload)
                            .map_err(|err| ProviderError::protocol(err.to_string()))?;
                        yield parsed;
                    }

                    if finished {
                        break;
                    }
                }
            };

            Ok(Box::pin(stream) as CompletionChunkStream<'a>)
        })
    }

    fn upload_file<'a>(
        &'a self,
        upload: FileUpload,
    ) -> ProviderFuture<'a, Result<UploadedFile, ProviderError>> {
        Box::pin(async move {
            let FileUpload {
                data,
                mime_type,
                file_name,
                purpose,
            } = upload;

            let part = reqwest::multipart::Part::bytes(data)
                .file_name(file_name)
                .mime_str(&mime_type)
                .map_err(|_| {
                    ProviderError::invalid_request(format!(
                        "media mime type '{mime_type}' is not valid"
                    ))
                })?;
            let form = reqwest::multipart::Form::new()
                .part("file", part)
                .text("purpose", purpose);

            let response = self
                .client
                .post(self.endpoint("files"))
                .bearer_auth(self.auth.token())
                .multipart(form)
                .send()
                .await
                .map_err(classify_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<UploadedFile>()
                .await
                .map_err(|err| ProviderError::protocol(err.to_string()))
        })
    }
}

fn classify_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    Some(parsed.message)
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    message: String,
}

/// Line buffer for server-sent-event payloads. Accumulates raw bytes so a
/// multi-byte character split across network chunks never lands on a decode
/// boundary; only complete lines are converted to text.
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, ProviderError> {
        self.pending.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(position) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=position).collect();
            let line = std::str::from_utf8(&line)
                .map_err(|err| ProviderError::protocol(err.to_string()))?
                .trim();

            if let Some(payload) = line.strip_prefix("data:") {
                payloads.push(payload.trim().to_string());
            }
        }

        Ok(payloads)
    }
}

/// In-memory chunk stream for tests and fakes.
#[derive(Debug)]
pub struct VecChunkStream {
    chunks: VecDeque<Result<CompletionResponse, ProviderError>>,
}

impl VecChunkStream {
    pub fn new(chunks: Vec<Result<CompletionResponse, ProviderError>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }
}

impl Stream for VecChunkStream {
    type Item = Result<CompletionResponse, ProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.chunks.pop_front())
    }
}
