//! OpenAI-compatible chat completions client

use std::fmt;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::config::LlmConfig;
use crate::errors::CaseRagError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::GenerationRequest;
use crate::llm::TextGenerator;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {endpoint}/chat/completions`
#[derive(Clone)]
pub struct ChatClient {
    http_client: Client,
    endpoint: String,
    api_key: String,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// `connect_timeout` only bounds connection setup. The whole call is bounded by
    /// the caller, so a slow response surfaces as the caller's timeout.
    ///
    /// # Errors
    /// - HTTP client build errors (TLS backend unavailable, invalid configuration)
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| CaseRagError::HttpError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    /// - No API key inline or in the configured environment variable
    /// - HTTP client build errors
    pub fn from_config(config: &LlmConfig, connect_timeout: Duration) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            CaseRagError::ConfigError(format!(
                "no API key configured (set llm.api_key or {})",
                config.api_key_env
            ))
        })?;
        Self::new(config.endpoint.clone(), api_key, connect_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

/// Extract the first choice's content from a completions response body
fn parse_completion(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| CaseRagError::LlmError(format!("malformed completion response: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CaseRagError::LlmError("No response content from model".to_string()))
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let start = Instant::now();
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                CaseRagError::HttpError(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CaseRagError::HttpError(e.to_string()))?;

        if !status.is_success() {
            warn!(status = %status, error = %text, "Chat completion API error");
            return Err(CaseRagError::LlmError(format!(
                "chat completion API returned {status}: {text}"
            )));
        }

        let content = parse_completion(&text)?;
        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio::net::TcpStream;
    use tokio::task::JoinHandle;

    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("rules"), ChatMessage::user("question")],
            temperature: 0.2,
        }
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve a single canned response; the handle yields the raw request
    async fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw_request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            raw_request
        });
        (format!("http://{addr}/v1/"), handle)
    }

    #[test]
    fn test_parse_completion_first_choice() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "first"}},
                                   {"message": {"role": "assistant", "content": "second"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "first");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(CaseRagError::LlmError(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices": [{"message": {"content": null}}]}"#),
            Err(CaseRagError::LlmError(_))
        ));
    }

    #[test]
    fn test_parse_completion_malformed() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(CaseRagError::LlmError(_))
        ));
    }

    #[test]
    fn test_from_config_without_key_fails() {
        let config = LlmConfig {
            api_key: String::new(),
            api_key_env: "CASERAG_TEST_NO_SUCH_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            ChatClient::from_config(&config, Duration::from_secs(5)),
            Err(CaseRagError::ConfigError(_))
        ));
    }

    #[test]
    fn test_debug_masks_key() {
        let client =
            ChatClient::new("http://localhost:11434/v1/", "sk-secret", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1");
        assert!(!format!("{client:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_generate_posts_chat_completion() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "  answer text \n"}}]}"#,
        )
        .await;
        let client = ChatClient::new(endpoint, "sk-test", Duration::from_secs(5)).unwrap();

        let content = client.generate(&request()).await.unwrap();
        assert_eq!(content, "  answer text \n");

        let raw_request = server.await.unwrap();
        assert!(raw_request.starts_with("POST /v1/chat/completions HTTP/1.1"));
        let lowered = raw_request.to_lowercase();
        assert!(lowered.contains("authorization: bearer sk-test"));
        assert!(raw_request.contains(r#""model":"gpt-4o-mini""#));
        assert!(raw_request.contains(r#""temperature":0.2"#));
        assert!(raw_request.contains(r#"{"role":"system","content":"rules"}"#));
    }

    #[tokio::test]
    async fn test_generate_maps_api_errors() {
        let (endpoint, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error": {"message": "quota exceeded"}}"#,
        )
        .await;
        let client = ChatClient::new(endpoint, "sk-test", Duration::from_secs(5)).unwrap();

        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(
            &err,
            CaseRagError::LlmError(msg) if msg.contains("429") && msg.contains("quota")
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_maps_network_errors() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            ChatClient::new(format!("http://{addr}/v1"), "sk-test", Duration::from_secs(5))
                .unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, CaseRagError::HttpError(_)));
        assert!(err.is_generation_failure());
    }
}
