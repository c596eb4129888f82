pub mod gemini;
pub mod openrouter;

use anyhow::Result;

use crate::domain::models::ProviderBox;
use crate::domain::models::ProviderFactory;
use crate::domain::models::ProviderName;

#[derive(Default)]
pub struct ProviderManager {}

impl ProviderManager {
    pub fn get(name: ProviderName, credential: &str) -> Result<ProviderBox> {
        match name {
            ProviderName::Gemini => return Ok(Box::new(gemini::Gemini::new(credential))),
            ProviderName::OpenRouter => {
                return Ok(Box::new(openrouter::OpenRouter::new(credential)))
            }
        }
    }
}

impl ProviderFactory for ProviderManager {
    fn create(&self, name: ProviderName, credential: &str) -> Result<ProviderBox> {
        return ProviderManager::get(name, credential);
    }
}
