use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;

pub const SYSTEM_PROMPT: &str = r#"You are a helpful travel and food assistant. When users ask about places to go, eat, or visit, respond ONLY with JSON in this exact format:

{
  "intent": "search_places",
  "category": "restaurant|cafe|park|museum|hotel|shopping|attraction",
  "location": "specific location mentioned",
  "query": "refined search query for Google Maps",
  "suggestions": ["place name 1", "place name 2", "place name 3"]
}

If the query is not about places, respond with:
{
  "intent": "general",
  "response": "your helpful response here"
}

Be concise and only respond with the JSON format."#;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    temperature: f64,
    top_p: f64,
}

/// Thin client for an OpenAI-compatible chat endpoint (Open WebUI by default).
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: Client,
    config: ClassifierConfig,
}

impl ClassifierClient {
    pub fn new(http: Client, config: ClassifierConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Cheap liveness check against `/health`.
    pub async fn is_available(&self) -> bool {
        let res = self
            .http
            .get(self.url("/health"))
            .timeout(self.config.probe_timeout)
            .send()
            .await;
        match res {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                log::debug!("classifier health check returned {}", res.status());
                false
            }
            Err(e) => {
                log::debug!("classifier health check failed: {:#}", e);
                false
            }
        }
    }

    /// Send the query and return the raw reply payload. A body that is not
    /// JSON comes back as a JSON string so extraction can still look at it.
    pub async fn complete(&self, query: &str) -> Result<Value, ClassifierError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
            stream: false,
            temperature: 0.1,
            top_p: 0.9,
        };

        let res = self
            .http
            .post(self.url("/api/chat/completions"))
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?;

        let text = res.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
