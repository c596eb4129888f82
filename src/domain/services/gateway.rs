#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use super::normalize;
use super::ProviderSelector;
use crate::domain::models::ChatPrompt;
use crate::domain::models::CredentialStore;
use crate::domain::models::GatewayError;
use crate::domain::models::GatewayResponse;
use crate::domain::models::ProviderFactory;
use crate::domain::models::ProviderName;
use crate::domain::models::ProviderRequest;

/// Result of a single provider call.
pub enum StageOutcome {
    Replied(String),
    Failed(anyhow::Error),
}

/// Progress of one gateway call. The secondary stage is entered either
/// directly or after a failed primary stage, and is never retried.
pub enum GatewayState {
    Idle,
    CallingPrimary,
    CallingSecondary { primary_failed: bool },
    Success(GatewayResponse),
    Failed {
        primary_failed: bool,
        source: anyhow::Error,
    },
}

impl GatewayState {
    pub fn start(provider: ProviderName) -> GatewayState {
        if provider.is_primary() {
            return GatewayState::CallingPrimary;
        }

        return GatewayState::CallingSecondary {
            primary_failed: false,
        };
    }

    /// Applies the outcome of the call made in the current stage. Stages
    /// that make no call are returned unchanged.
    pub fn advance(self, outcome: StageOutcome) -> GatewayState {
        match (self, outcome) {
            (GatewayState::CallingPrimary, StageOutcome::Replied(text)) => {
                return GatewayState::Success(normalize(&text));
            }
            (GatewayState::CallingPrimary, StageOutcome::Failed(err)) => {
                tracing::warn!(error = ?err, "Gemini failed, falling back to OpenRouter");
                return GatewayState::CallingSecondary {
                    primary_failed: true,
                };
            }
            (GatewayState::CallingSecondary { .. }, StageOutcome::Replied(text)) => {
                return GatewayState::Success(normalize(&text));
            }
            (GatewayState::CallingSecondary { primary_failed }, StageOutcome::Failed(err)) => {
                tracing::error!(error = ?err, primary_failed, "OpenRouter request failed");
                return GatewayState::Failed {
                    primary_failed,
                    source: err,
                };
            }
            (state, _) => return state,
        }
    }
}

pub struct Gateway {
    store: Box<dyn CredentialStore + Send + Sync>,
    factory: Box<dyn ProviderFactory + Send + Sync>,
    fallback_credential: String,
}

impl Gateway {
    pub fn new(
        store: Box<dyn CredentialStore + Send + Sync>,
        factory: Box<dyn ProviderFactory + Send + Sync>,
        fallback_credential: &str,
    ) -> Gateway {
        return Gateway {
            store,
            factory,
            fallback_credential: fallback_credential.to_string(),
        };
    }

    async fn call(&self, name: ProviderName, credential: &str, prompt: &ChatPrompt) -> StageOutcome {
        let provider = match self.factory.create(name, credential) {
            Ok(provider) => provider,
            Err(err) => return StageOutcome::Failed(err),
        };

        let request = ProviderRequest::build(prompt, name);
        tracing::debug!(provider = %provider.name(), turns = prompt.history.len(), "Sending completion request");
        match provider.complete(&request).await {
            Ok(text) => return StageOutcome::Replied(text),
            Err(err) => return StageOutcome::Failed(err),
        }
    }

    /// Sends the next turn of a conversation, falling back to OpenRouter once
    /// when Gemini fails.
    pub async fn send(&self, prompt: &ChatPrompt) -> Result<GatewayResponse, GatewayError> {
        let selection = ProviderSelector::new(self.store.as_ref(), &self.fallback_credential)
            .select()
            .await?;

        let mut state = GatewayState::Idle;
        loop {
            state = match state {
                GatewayState::Idle => GatewayState::start(selection.provider),
                GatewayState::CallingPrimary => {
                    let outcome = self
                        .call(ProviderName::Gemini, &selection.credential, prompt)
                        .await;
                    GatewayState::CallingPrimary.advance(outcome)
                }
                GatewayState::CallingSecondary { primary_failed } => {
                    let outcome = self
                        .call(ProviderName::OpenRouter, &self.fallback_credential, prompt)
                        .await;
                    GatewayState::CallingSecondary { primary_failed }.advance(outcome)
                }
                GatewayState::Success(res) => return Ok(res),
                GatewayState::Failed {
                    primary_failed: true,
                    source,
                } => return Err(GatewayError::BothProvidersFailed { source }),
                GatewayState::Failed {
                    primary_failed: false,
                    source,
                } => {
                    return Err(GatewayError::ProviderTransport {
                        provider: ProviderName::OpenRouter,
                        source,
                    })
                }
            };
        }
    }
}
