#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;

use crate::domain::models::CredentialStore;
use crate::domain::models::GatewayError;
use crate::domain::models::ProviderName;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub provider: ProviderName,
    pub credential: String,
}

/// Picks the provider for a call from locally stored state only.
pub struct ProviderSelector<'a> {
    store: &'a (dyn CredentialStore + Send + Sync),
    fallback_credential: &'a str,
}

impl<'a> ProviderSelector<'a> {
    pub fn new(
        store: &'a (dyn CredentialStore + Send + Sync),
        fallback_credential: &'a str,
    ) -> ProviderSelector<'a> {
        return ProviderSelector {
            store,
            fallback_credential,
        };
    }

    pub async fn select(&self) -> Result<Selection, GatewayError> {
        let active = match self.store.get_active().await {
            Ok(active) => active,
            Err(err) => {
                tracing::warn!(error = ?err, "Unable to read the active API key");
                None
            }
        };

        if let Some(secret) = active {
            if !secret.trim().is_empty() {
                return Ok(Selection {
                    provider: ProviderName::Gemini,
                    credential: secret,
                });
            }
        }

        if self.fallback_credential.is_empty() {
            return Err(GatewayError::CredentialMissing);
        }

        return Ok(Selection {
            provider: ProviderName::OpenRouter,
            credential: self.fallback_credential.to_string(),
        });
    }
}
