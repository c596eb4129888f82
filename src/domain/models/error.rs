use super::ProviderName;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No active API key is stored and no fallback token is configured")]
    CredentialMissing,

    #[error("{provider} request failed: {source}")]
    ProviderTransport {
        provider: ProviderName,
        source: anyhow::Error,
    },

    #[error("Both AI providers failed. Please try again later.")]
    BothProvidersFailed { source: anyhow::Error },
}
