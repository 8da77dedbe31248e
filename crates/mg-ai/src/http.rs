//! OpenAI-compatible chat completion client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::AiError;
use crate::service::{CallOptions, CompletionService};

/// Completion service backed by a `/chat/completions` endpoint.
///
/// Requests are blocking `ureq` calls moved onto tokio's blocking pool.
#[derive(Clone)]
pub struct HttpCompletionService {
    agent: Agent,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl std::fmt::Debug for HttpCompletionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionService")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpCompletionService {
    /// Create a client for `endpoint` (e.g. `https://api.openai.com/v1`).
    ///
    /// `timeout` bounds each HTTP request end to end.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
        }
    }

    /// Default model.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

impl CompletionService for HttpCompletionService {
    fn enabled(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str, options: &CallOptions) -> Result<String, AiError> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let payload = serde_json::to_vec(&ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
        })
        .map_err(|e| AiError::Transport(e.to_string()))?;

        let agent = self.agent.clone();
        let url = self.url();
        let api_key = self.api_key.clone();
        tracing::debug!(url = %url, model, "Requesting completion");

        tokio::task::spawn_blocking(move || send_chat(&agent, &url, api_key.as_deref(), &payload))
            .await
            .map_err(|e| AiError::Task(e.to_string()))?
    }
}

fn send_chat(
    agent: &Agent,
    url: &str,
    api_key: Option<&str>,
    payload: &[u8],
) -> Result<String, AiError> {
    let mut request = agent
        .post(url)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");
    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {key}"));
    }

    let response = request.send(payload)?;
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(AiError::Http {
            status,
            body: error_body,
        });
    }

    let text = body.read_to_string()?;
    parse_completion(&text)
}

/// Extract `choices[0].message.content` from a response body.
fn parse_completion(body: &str) -> Result<String, AiError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AiError::MalformedResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AiError::MalformedResponse("no completion in response".to_owned()))
}
