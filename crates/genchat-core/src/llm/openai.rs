use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::endpoints;
use crate::error::{GenChatError, Result};
use crate::llm::traits::*;

pub struct OpenAIBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| GenChatError::upstream(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GenChatError::upstream(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(GenChatError::upstream(format!(
                "OpenAI API error ({}): {}",
                status, response_text
            )));
        }

        Ok(response_text)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
    b64_json: Option<String>,
}

/// Wire form of the outbound message list. Only `user`, `assistant` and
/// `system` exist upstream.
pub(crate) fn wire_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::ImageAssistant => Role::Assistant,
                other => other,
            };
            serde_json::json!({
                "role": role.as_str(),
                "content": m.content,
            })
        })
        .collect()
}

fn parse_chat_response(body: &str) -> Result<String> {
    let api_response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenChatError::upstream(format!("Failed to parse response: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenChatError::upstream("No response from API"))?;

    Ok(choice.message.content.unwrap_or_default())
}

fn parse_image_response(body: &str) -> Result<Vec<ImageRef>> {
    let api_response: ImageResponse = serde_json::from_str(body)
        .map_err(|e| GenChatError::upstream(format!("Failed to parse image response: {e}")))?;

    Ok(api_response
        .data
        .into_iter()
        .filter_map(|d| match (d.url, d.b64_json) {
            (Some(url), _) => Some(ImageRef::Url(url)),
            (None, Some(b64)) => Some(ImageRef::Base64(b64)),
            (None, None) => None,
        })
        .collect())
}

#[async_trait::async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String> {
        let request_body = ChatRequest {
            model,
            messages: wire_messages(messages),
        };
        let body = self
            .post_json(endpoints::CHAT_COMPLETIONS_PATH, &request_body)
            .await?;
        parse_chat_response(&body)
    }

    async fn create_image(&self, request: &ImageRequest) -> Result<Vec<ImageRef>> {
        let body = self
            .post_json(endpoints::IMAGE_GENERATIONS_PATH, request)
            .await?;
        parse_image_response(&body)
    }

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>> {
        match image {
            ImageRef::Url(url) => {
                tracing::debug!("GET {}", url);
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| GenChatError::upstream(format!("Image download failed: {e}")))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(GenChatError::upstream(format!(
                        "Image download failed ({status})"
                    )));
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| GenChatError::upstream(format!("Image download failed: {e}")))?;
                Ok(bytes.to_vec())
            }
            ImageRef::Base64(data) => base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| GenChatError::upstream(format!("Invalid base64 image data: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    #[test]
    fn parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}},
                       {"message":{"role":"assistant","content":"ignored"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "Hi there");
    }

    #[test]
    fn empty_choices_is_upstream_error() {
        let err = parse_chat_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, GenChatError::Upstream(_)));
    }

    #[test]
    fn null_content_becomes_empty_text() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "");
    }

    #[test]
    fn parses_url_and_inline_images() {
        let body = r#"{"created":1,"data":[{"url":"https://img/a.png"},{"b64_json":"AAEC"},{}]}"#;
        let images = parse_image_response(body).unwrap();
        assert_eq!(
            images,
            vec![
                ImageRef::Url("https://img/a.png".into()),
                ImageRef::Base64("AAEC".into())
            ]
        );
    }

    #[test]
    fn image_request_wire_shape() {
        let request = ImageRequest {
            model: "dall-e-3".into(),
            prompt: "a cat".into(),
            n: 1,
            size: "1024x1024".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"model":"dall-e-3","prompt":"a cat","n":1,"size":"1024x1024"})
        );
    }

    #[test]
    fn wire_messages_keep_role_and_content() {
        let wire = wire_messages(&[Message::system("be brief"), Message::user("Hello")]);
        assert_eq!(wire[0], serde_json::json!({"role":"system","content":"be brief"}));
        assert_eq!(wire[1], serde_json::json!({"role":"user","content":"Hello"}));
    }

    #[tokio::test]
    async fn decodes_inline_image() {
        let backend = OpenAIBackend::new("key");
        let bytes = backend
            .fetch_image(&ImageRef::Base64("AAEC".into()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = OpenAIBackend::new("key").with_base_url("http://localhost:8080/");
        assert_eq!(backend.base_url(), "http://localhost:8080");
    }

    // ========================================================================
    // HTTP round trips against a local one-shot server
    // ========================================================================

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    /// Answer a single request with `status` and `body`. The handle resolves
    /// to the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn request_body(raw: &str) -> Value {
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn complete_posts_model_and_messages_with_bearer_token() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Hi!"}}]}"#,
        )
        .await;
        let backend = OpenAIBackend::new("sk-test").with_base_url(base_url);

        let reply = backend
            .complete("gpt-3.5-turbo", &[Message::user("Hello")])
            .await
            .unwrap();
        assert_eq!(reply, "Hi!");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions HTTP/1.1"));
        assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
        assert_eq!(
            request_body(&raw),
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Hello"}]
            })
        );
    }

    #[tokio::test]
    async fn error_status_is_upstream_error_with_status() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error":{"message":"Rate limit reached"}}"#,
        )
        .await;
        let backend = OpenAIBackend::new("sk-test").with_base_url(base_url);

        let err = backend
            .complete("gpt-3.5-turbo", &[Message::user("Hello")])
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            GenChatError::Upstream(message) => {
                assert!(message.contains("429"), "{message}");
                assert!(message.contains("Rate limit reached"), "{message}");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_upstream_error() {
        let (base_url, server) = serve_once("200 OK", "<html>gateway hiccup</html>").await;
        let backend = OpenAIBackend::new("sk-test").with_base_url(base_url);

        let err = backend
            .complete("gpt-3.5-turbo", &[Message::user("Hello")])
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, GenChatError::Upstream(_)));
    }

    #[tokio::test]
    async fn create_image_posts_to_image_endpoint() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"created":1,"data":[{"url":"https://img/1.png"}]}"#).await;
        let backend = OpenAIBackend::new("sk-test").with_base_url(base_url);

        let request = ImageRequest {
            model: "dall-e-3".into(),
            prompt: "a lighthouse".into(),
            n: 1,
            size: "1024x1024".into(),
        };
        let images = backend.create_image(&request).await.unwrap();
        assert_eq!(images, vec![ImageRef::Url("https://img/1.png".into())]);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/images/generations HTTP/1.1"));
        assert_eq!(
            request_body(&raw),
            serde_json::json!({"model":"dall-e-3","prompt":"a lighthouse","n":1,"size":"1024x1024"})
        );
    }

    #[tokio::test]
    async fn image_auth_failure_is_upstream_error() {
        let (base_url, server) =
            serve_once("401 Unauthorized", r#"{"error":{"message":"Incorrect API key"}}"#).await;
        let backend = OpenAIBackend::new("sk-wrong").with_base_url(base_url);

        let request = ImageRequest {
            model: "dall-e-2".into(),
            prompt: "a lighthouse".into(),
            n: 1,
            size: "1024x1024".into(),
        };
        let err = backend.create_image(&request).await.unwrap_err();
        server.await.unwrap();

        assert!(err.is_upstream());
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn fetch_image_downloads_url_and_rejects_error_status() {
        let (base_url, server) = serve_once("200 OK", "PNGDATA").await;
        let backend = OpenAIBackend::new("sk-test");
        let bytes = backend
            .fetch_image(&ImageRef::Url(format!("{base_url}/img/1.png")))
            .await
            .unwrap();
        assert_eq!(bytes, b"PNGDATA");
        assert!(server.await.unwrap().starts_with("GET /img/1.png HTTP/1.1"));

        let (base_url, server) = serve_once("404 Not Found", "").await;
        let err = backend
            .fetch_image(&ImageRef::Url(format!("{base_url}/img/2.png")))
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, GenChatError::Upstream(ref m) if m.contains("404")));
    }

    #[tokio::test]
    async fn unreachable_server_is_upstream_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let backend = OpenAIBackend::new("sk-test").with_base_url(base_url);
        let err = backend
            .complete("gpt-3.5-turbo", &[Message::user("Hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, GenChatError::Upstream(_)));
    }
}
