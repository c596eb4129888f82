#[cfg(test)]
#[path = "openrouter_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Provider;
use crate::domain::models::ProviderName;
use crate::domain::models::ProviderRequest;
use crate::domain::models::SecondaryMessage;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<SecondaryMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

/// OpenAI compatible chat completions, hosted by OpenRouter by default.
pub struct OpenRouter {
    url: String,
    token: String,
    model: String,
    temperature: String,
    max_tokens: String,
    referer: String,
    title: String,
    timeout: String,
}

impl OpenRouter {
    pub fn new(token: &str) -> OpenRouter {
        return OpenRouter {
            url: Config::get(ConfigKey::OpenRouterURL),
            token: token.to_string(),
            model: Config::get(ConfigKey::OpenRouterModel),
            temperature: Config::get(ConfigKey::OpenRouterTemperature),
            max_tokens: Config::get(ConfigKey::OpenRouterMaxTokens),
            referer: Config::get(ConfigKey::OpenRouterReferer),
            title: Config::get(ConfigKey::OpenRouterTitle),
            timeout: Config::get(ConfigKey::HealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Provider for OpenRouter {
    fn name(&self) -> ProviderName {
        return ProviderName::OpenRouter;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("OpenRouter URL is not defined");
        }
        if self.token.is_empty() {
            bail!("OpenRouter token is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!("{url}/api/v1/models", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "OpenRouter is not reachable");
            bail!("OpenRouter is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "OpenRouter health check failed");
            bail!("OpenRouter health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn complete(&self, request: &ProviderRequest) -> Result<String> {
        let messages = match request {
            ProviderRequest::Secondary(req) => req.messages.clone(),
            ProviderRequest::Primary(_) => {
                bail!("OpenRouter cannot send a request shaped for {}", request.provider())
            }
        };
        if self.token.is_empty() {
            bail!("OpenRouter token is not defined");
        }

        let req = CompletionRequest {
            model: self.model.to_string(),
            messages,
            temperature: self.temperature.parse::<f32>()?,
            max_tokens: self.max_tokens.parse::<u32>()?,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/api/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request to OpenRouter"
            );
            bail!(format!(
                "Failed to make completion request to OpenRouter, {}",
                res.status().as_u16()
            ));
        }

        let body = res.json::<CompletionResponse>().await?;
        tracing::debug!(body = ?body, "Completion response");

        let text = match body.choices.first() {
            Some(choice) => choice.message.content.clone().unwrap_or_default(),
            None => bail!("OpenRouter returned no choices"),
        };

        return Ok(text);
    }
}
