//! HTTP chat-completions implementation of the scoring oracle seam.
//!
//! Talks to any OpenAI-compatible endpoint. The request carries a finite
//! timeout so no match stage can block indefinitely on a slow model.

use crate::config::OracleConfig;
use crate::workflows::recruit::gateways::GatewaySetupError;
use crate::workflows::recruit::matching::{OracleError, ScoreOracle};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

pub struct ChatCompletionOracle {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    runtime: Runtime,
}

impl ChatCompletionOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, GatewaySetupError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GatewaySetupError::Http(err.to_string()))?;
        let runtime = Runtime::new().map_err(|err| GatewaySetupError::Runtime(err.to_string()))?;

        Ok(Self {
            http,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            runtime,
        })
    }
}

impl std::fmt::Debug for ChatCompletionOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionOracle")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ScoreOracle for ChatCompletionOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        self.runtime.block_on(async {
            let response = self
                .http
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|err| OracleError::Transport(err.to_string()))?
                .error_for_status()
                .map_err(|err| OracleError::Transport(err.to_string()))?;

            let body: ChatResponse = response
                .json()
                .await
                .map_err(|err| OracleError::Malformed(err.to_string()))?;

            body.choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| OracleError::Malformed("response contained no choices".to_string()))
        })
    }
}
