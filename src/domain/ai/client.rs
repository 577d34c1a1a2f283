use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};

use crate::domain::prompt::PromptPair;
use crate::error::AppError;

/// Map an OpenAI failure onto the generation error variants.
fn classify_openai_error(error: OpenAIError) -> AppError {
    match &error {
        OpenAIError::ApiError(api_err) => {
            let err_type = api_err.r#type.as_deref().unwrap_or("");
            let message = api_err.message.to_lowercase();

            if message.contains("api key") || err_type == "authentication_error" {
                AppError::GenerationAuth
            } else if err_type == "rate_limit_error"
                || err_type == "insufficient_quota"
                || message.contains("rate limit")
                || message.contains("quota")
            {
                AppError::GenerationRateLimit
            } else {
                AppError::Generation(api_err.message.clone())
            }
        }
        OpenAIError::Reqwest(req_err) => match req_err.status().map(|s| s.as_u16()) {
            Some(401) => AppError::GenerationAuth,
            Some(429) => AppError::GenerationRateLimit,
            _ => AppError::Generation(req_err.to_string()),
        },
        _ => AppError::Generation(error.to_string()),
    }
}

/// Text-generation service.
///
/// Takes the assembled prompt pair and returns the generated notes. The
/// caller bounds the wait; implementations need not time out themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NotesGenerator: Send + Sync {
    async fn generate(&self, prompt: &PromptPair) -> Result<String, AppError>;
}

pub type SharedGenerator = Arc<dyn NotesGenerator>;

/// OpenAI chat completion client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl NotesGenerator for OpenAiClient {
    async fn generate(&self, prompt: &PromptPair) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(vec![
                build_system_message(&prompt.system_prompt)?,
                build_user_message(&prompt.user_message)?,
            ])
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(model = %self.model, "Requesting notes generation");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_openai_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Generation("Model returned no content".to_string()))?;

        Ok(content)
    }
}

pub(crate) fn build_system_message(content: &str) -> Result<ChatCompletionRequestMessage, AppError> {
    Ok(ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    ))
}

pub(crate) fn build_user_message(content: &str) -> Result<ChatCompletionRequestMessage, AppError> {
    Ok(ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    ))
}
