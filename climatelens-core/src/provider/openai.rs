use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{config::DEFAULT_SUMMARY_MODEL, model::SummaryText};

use super::{
    ProviderId, SummaryProvider, UpstreamFailure, decode_body, success_body, trim_base_url,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

const PROMPT_PREFIX: &str = "Summarize this climate data for students: ";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    api_key: Option<String>,
    base_url: String,
    model: String,
    http: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    async fn summarize(&self, text: &str) -> Result<SummaryText, UpstreamFailure> {
        const PROVIDER: ProviderId = ProviderId::OpenAi;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamFailure::MissingCredential { provider: PROVIDER })?;

        let prompt = format!("{PROMPT_PREFIX}{text}");

        let res = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&self.request_body(&prompt))
            .send()
            .await
            .map_err(|source| UpstreamFailure::Transport {
                provider: PROVIDER,
                source,
            })?;

        let body = success_body(PROVIDER, res).await?;

        let parsed: ChatResponse = decode_body(PROVIDER, &body)?;

        // An empty choice list is a malformed completion, same as a bad body.
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamFailure::Decode {
                provider: PROVIDER,
                source: serde::de::Error::custom("completion contained no choices"),
            })?;

        Ok(SummaryText::new(choice.message.content))
    }
}
