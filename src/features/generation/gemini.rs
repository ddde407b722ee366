//! Google Gemini streaming backend over the public REST API.

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::backend::{ChunkStream, GenerationBackend, GenerationRequest};
use super::error::{GenerationError, GenerationErrorKind};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Models known to work with the chat command
pub const KNOWN_MODELS: &[&str] = &[
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

#[derive(Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn stream(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<ChunkStream, GenerationError> {
        let body = GeminiRequest::from(request);
        let url = self.stream_url(request.model());
        debug!("POST {url} (temperature {})", request.temperature());

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error_from_body(status.as_u16(), &body));
        }

        let sse = Box::pin(decode_sse(response.bytes_stream()));
        let chunks = sse.filter_map(|event| async move {
            match event {
                Ok(data) => match parse_event(&data) {
                    Ok(text) if text.is_empty() => None,
                    other => Some(other),
                },
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(chunks))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

impl From<&GenerationRequest> for GeminiRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt().to_string()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "text/plain",
                temperature: request.temperature(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiStreamEvent {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiApiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiApiError {
    fn into_error(self, fallback_code: u16) -> GenerationError {
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| fallback_code.to_string());
        let detail = match self.status {
            Some(status) => format!("{status}: {}", self.message),
            None => self.message,
        };
        GenerationError::api(code, detail)
    }
}

fn api_error_from_body(status: u16, body: &str) -> GenerationError {
    match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.into_error(status),
        Err(_) => GenerationError::api(status.to_string(), body.to_string()),
    }
}

/// Text carried by one SSE `data:` payload
fn parse_event(data: &str) -> Result<String, GenerationError> {
    let event: GeminiStreamEvent = serde_json::from_str(data)?;
    if let Some(error) = event.error {
        return Err(error.into_error(500));
    }

    let text = event
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

/// Split a byte stream into SSE `data:` payloads.
///
/// Bytes are buffered until a blank line closes the event, so a multi-byte
/// character split across reads is decoded whole.
fn decode_sse<S, B, E>(bytes_stream: S) -> impl Stream<Item = Result<String, GenerationError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    futures_util::stream::unfold(
        (bytes_stream, Vec::<u8>::new(), false),
        |(mut stream, mut buffer, finished)| async move {
            if finished {
                return None;
            }
            loop {
                if let Some(raw) = split_event(&mut buffer) {
                    let data = event_data(&String::from_utf8_lossy(&raw));
                    if data.is_empty() {
                        continue;
                    }
                    return Some((Ok(data), (stream, buffer, false)));
                }

                match stream.next().await {
                    Some(Ok(chunk)) => {
                        buffer.extend_from_slice(chunk.as_ref());
                        continue;
                    }
                    Some(Err(e)) => {
                        let err = GenerationError::new(GenerationErrorKind::Transport, e.to_string());
                        return Some((Err(err), (stream, buffer, true)));
                    }
                    None => {
                        // Flush a final event that was not followed by a blank line
                        let data = event_data(&String::from_utf8_lossy(&buffer));
                        if data.is_empty() {
                            return None;
                        }
                        return Some((Ok(data), (stream, Vec::new(), true)));
                    }
                }
            }
        },
    )
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Remove the first complete event from the buffer, without its separator
fn split_event(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let crlf = find_bytes(buffer, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find_bytes(buffer, b"\n\n").map(|i| (i, 2));
    let (idx, sep) = match (crlf, lf) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b)?,
    };
    let rest = buffer.split_off(idx + sep);
    buffer.truncate(idx);
    Some(std::mem::replace(buffer, rest))
}

fn event_data(raw: &str) -> String {
    raw.lines()
        .filter_map(|line| line.trim_end().strip_prefix("data:"))
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(
        parts: Vec<&'static str>,
    ) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Unpin + 'static {
        futures_util::stream::iter(parts.into_iter().map(|p| Ok(p.as_bytes().to_vec())))
    }

    #[tokio::test]
    async fn test_decode_sse_across_chunk_boundaries() {
        let stream = decode_sse(byte_stream(vec![
            "data: {\"a\":",
            "1}\n\ndata: {\"b\":2}\n",
            "\n",
        ]));
        let events: Vec<_> = stream.map(|e| e.unwrap()).collect().await;
        assert_eq!(events, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[tokio::test]
    async fn test_decode_sse_flushes_trailing_event() {
        let stream = decode_sse(byte_stream(vec!["data: last"]));
        let events: Vec<_> = stream.map(|e| e.unwrap()).collect().await;
        assert_eq!(events, vec!["last"]);
    }

    #[tokio::test]
    async fn test_decode_sse_keeps_split_multibyte_char() {
        let event = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"café\"}]}}]}\n\n";
        let bytes = event.as_bytes();
        let cut = event.find('é').unwrap() + 1;
        let parts: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(bytes[..cut].to_vec()), Ok(bytes[cut..].to_vec())];

        let events: Vec<_> = decode_sse(futures_util::stream::iter(parts))
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(parse_event(&events[0]).unwrap(), "café");
    }

    #[test]
    fn test_parse_event_text() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        assert_eq!(parse_event(data).unwrap(), "Hello");
    }

    #[test]
    fn test_parse_event_without_text() {
        let data = r#"{"candidates":[{"finishReason":"STOP"}]}"#;
        assert_eq!(parse_event(data).unwrap(), "");
    }

    #[test]
    fn test_parse_event_error() {
        let data = r#"{"error":{"code":503,"message":"overloaded","status":"UNAVAILABLE"}}"#;
        let err = parse_event(data).unwrap_err();
        assert_eq!(err.api_code(), Some("503"));
    }

    #[test]
    fn test_api_error_from_body() {
        let body = r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = api_error_from_body(429, body);
        assert_eq!(err.api_code(), Some("429"));
        assert!(err.detail.contains("RESOURCE_EXHAUSTED"));

        let err = api_error_from_body(502, "<html>bad gateway</html>");
        assert_eq!(err.api_code(), Some("502"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::new("hi", "gemini-2.0-flash", 0.5);
        let json = serde_json::to_value(GeminiRequest::from(&request)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_stream_url() {
        let backend = GeminiBackend::new(reqwest::Client::new()).with_base_url("http://x/v1/");
        assert_eq!(
            backend.stream_url("m"),
            "http://x/v1/models/m:streamGenerateContent?alt=sse"
        );
    }
}
