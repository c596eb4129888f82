use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;

use super::ProviderRequest;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderName {
    Gemini,
    OpenRouter,
}

impl ProviderName {
    pub fn is_primary(&self) -> bool {
        return *self == ProviderName::Gemini;
    }
}

#[async_trait]
pub trait Provider {
    fn name(&self) -> ProviderName;

    /// Verifies the provider is configured and reachable. Used by the
    /// `status` command, never on the completion path.
    async fn health_check(&self) -> Result<()>;

    /// Sends one completion request and returns the raw reply text. A
    /// request shaped for another provider is rejected without a network
    /// call.
    async fn complete(&self, request: &ProviderRequest) -> Result<String>;
}

pub type ProviderBox = Box<dyn Provider + Send + Sync>;

/// Builds a provider for a credential chosen at call time.
pub trait ProviderFactory {
    fn create(&self, name: ProviderName, credential: &str) -> Result<ProviderBox>;
}
