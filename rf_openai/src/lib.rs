/// Thin completion client over the `OpenAI` chat API.
///
/// The rest of the pipeline only needs "system prompt + user prompt in,
/// free-form text out", so that is the whole surface here. Sampling
/// parameters are configuration, not constants, and transport failures
/// are retried with bounded exponential backoff before giving up.
use std::future::Future;
use std::time::Duration;

use openai_dive::v1::api::Client;
use openai_dive::v1::error::APIError;
use openai_dive::v1::resources::chat::{
    ChatCompletionParameters, ChatCompletionParametersBuilder,
    ChatCompletionResponse, ChatMessage, ChatMessageContent,
};
use thiserror::Error;

const BASE_WAIT_TIME_MS: u64 = 500;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("language model request failed: {0}")]
    Api(String),
    #[error("language model rejected the request: {0}")]
    InvalidRequest(String),
    #[error("language model request timed out after {0} seconds")]
    Timeout(u64),
    #[error("language model reply had no text content")]
    EmptyReply,
    #[error("failed to build chat parameters: {0}")]
    Parameters(String),
}

/// Sampling policy for completion calls.
///
/// The defaults keep replies short and deterministic-ish, which is what
/// the relevance scorer wants.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl SamplingConfig {
    #[must_use]
    pub fn new(model: String) -> Self {
        Self {
            model,
            temperature: 0.5,
            max_tokens: 150,
            timeout: Duration::from_secs(30),
        }
    }
}

/// The completion capability the pipeline components depend on.
///
/// Implemented by [`CompletionClient`] for production and by scripted
/// fakes in tests.
pub trait Completer {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

impl<C: Completer + Sync> Completer for &C {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        (**self).complete(system_prompt, user_prompt).await
    }
}

pub struct CompletionClient {
    client: Client,
    sampling: SamplingConfig,
}

impl CompletionClient {
    #[must_use]
    pub fn new(api_key: String, sampling: SamplingConfig) -> Self {
        Self {
            client: Client::new(api_key),
            sampling,
        }
    }

    fn build_parameters(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ChatCompletionParameters, CompletionError> {
        ChatCompletionParametersBuilder::default()
            .model(self.sampling.model.clone())
            .temperature(self.sampling.temperature)
            .max_completion_tokens(self.sampling.max_tokens)
            .messages(vec![
                ChatMessage::System {
                    name: None,
                    content: ChatMessageContent::Text(
                        system_prompt.to_string(),
                    ),
                },
                ChatMessage::User {
                    name: None,
                    content: ChatMessageContent::Text(
                        user_prompt.to_string(),
                    ),
                },
            ])
            .build()
            .map_err(|e| CompletionError::Parameters(e.to_string()))
    }
}

impl Completer for CompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        let parameters =
            self.build_parameters(system_prompt, user_prompt)?;

        let mut attempts: u32 = 0;

        loop {
            let outcome = tokio::time::timeout(
                self.sampling.timeout,
                self.client.chat().create(parameters.clone()),
            )
            .await;

            match outcome {
                Ok(Ok(response)) => return extract_text(&response),
                Ok(Err(APIError::InvalidRequestError(message))) => {
                    // Retrying an invalid request would just repeat it.
                    return Err(CompletionError::InvalidRequest(message));
                }
                Ok(Err(e)) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(CompletionError::Api(e.to_string()));
                    }
                    tracing::warn!(
                        "completion attempt {attempts} failed: {e}"
                    );
                }
                Err(_) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(CompletionError::Timeout(
                            self.sampling.timeout.as_secs(),
                        ));
                    }
                    tracing::warn!(
                        "completion attempt {attempts} timed out"
                    );
                }
            }

            let wait_time_ms = BASE_WAIT_TIME_MS * 2u64.pow(attempts);
            tokio::time::sleep(Duration::from_millis(wait_time_ms)).await;
        }
    }
}

fn extract_text(
    response: &ChatCompletionResponse,
) -> Result<String, CompletionError> {
    let choice =
        response.choices.first().ok_or(CompletionError::EmptyReply)?;

    match &choice.message {
        ChatMessage::Assistant {
            content: Some(ChatMessageContent::Text(text)),
            ..
        } => Ok(text.clone()),
        _ => Err(CompletionError::EmptyReply),
    }
}
