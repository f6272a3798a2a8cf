//! Chat-completion generation client

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use log::{debug, trace, error};

const OPENAI_API_BASE: &str
  = "https://api.openai.com/v1";

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: u32
  , pub temperature: f64
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
  , pub usage: Usage
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage
{   pub total_tokens: u64
}

// ===== Outcome =====

/// One completed generation: text, wall-clock latency, and the
/// service-reported total token consumption (prompt + completion)
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome
{   pub text: String
  , pub latency: Duration
  , pub token_count: u64
}

// ===== Client =====

/// Client for an OpenAI-compatible chat-completion endpoint
pub struct ChatClient
{   api_key: Option<String>
  , api_base: String
  , http_client: reqwest::Client
}

impl ChatClient
{   /// Create a new client; no network activity until `generate`
    pub fn new(
      api_key: Option<String>
    , api_base: Option<String>
    ) -> Self
    {   debug!("Creating ChatClient");
        ChatClient
        {   api_key
          , api_base: api_base
              .unwrap_or_else(|| OPENAI_API_BASE.to_string())
          , http_client: reqwest::Client::new()
        }
    }

    fn get_api_key(&self)
      -> Result<&str, crate::error::Error>
    {   self.api_key.as_deref().ok_or_else(|| {
          error!("No API key configured");
          crate::error::Error::MissingApiKey(
            "chat-completion endpoint".to_string()
          )
        })
    }

    /// Send one prompt to the named model and await the completion
    /// Errors propagate to the caller; nothing is retried
    pub async fn generate(
      &self
    , model: &str
    , prompt: &str
    , max_tokens: u32
    , temperature: f64
    ) -> Result<GenerationOutcome, crate::error::Error>
    {   debug!("Generating with model: {}", model);

        if max_tokens == 0
        {   error!("max_tokens must be positive");
            return Err(crate::error::Error::InvalidConfiguration(
              "max_tokens must be greater than zero".to_string()
            ));
        }
        if !temperature.is_finite() || temperature < 0.0
        {   error!("Invalid temperature: {}", temperature);
            return Err(crate::error::Error::InvalidConfiguration(
              format!("temperature must be >= 0, got {}", temperature)
            ));
        }

        let api_key = self.get_api_key()?;

        let request = ChatCompletionRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , max_tokens
          , temperature
        };

        trace!("Chat request: {:?}", request);

        let start = Instant::now();
        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::HttpError(e.to_string())
          })?;
        let latency = start.elapsed();

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            let detail = extract_error_message(&error_text)
              .unwrap_or(error_text);
            error!("Chat API error ({}): {}", status, detail);
            return Err(crate::error::Error::ApiError(
              format!("{}: {}", status, detail)
            ));
        }

        let chat_response: ChatCompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        let text = chat_response.choices.first()
          .map(|c| c.message.content.clone())
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::NoChoicesInResponse
          })?;

        debug!(
          "Model {} replied with {} tokens in {:.3}s",
          model,
          chat_response.usage.total_tokens,
          latency.as_secs_f64()
        );

        Ok(GenerationOutcome
        {   text
          , latency
          , token_count: chat_response.usage.total_tokens
        })
    }
}

/// Pull the `error.message` field out of an API error body, if any
fn extract_error_message(body: &str) -> Option<String>
{   let value: serde_json::Value
      = serde_json::from_str(body).ok()?;
    value.get("error")?
      .get("message")?
      .as_str()
      .map(|s| s.to_string())
}
