#[cfg(test)]
#[path = "request_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ChatPrompt;
use super::ProviderName;
use super::Sender;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryPart {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<PrimaryPart>,
}

impl PrimaryContent {
    fn text(role: Option<&str>, text: &str) -> PrimaryContent {
        return PrimaryContent {
            role: role.map(|e| return e.to_string()),
            parts: vec![PrimaryPart {
                text: text.to_string(),
            }],
        };
    }
}

/// Body of a Gemini `generateContent` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryRequest {
    pub system_instruction: PrimaryContent,
    pub contents: Vec<PrimaryContent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryMessage {
    pub role: String,
    pub content: String,
}

/// Messages of an OpenAI compatible chat completion. Model, temperature and
/// token budget belong to the backend configuration and are added there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryRequest {
    pub messages: Vec<SecondaryMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderRequest {
    Primary(PrimaryRequest),
    Secondary(SecondaryRequest),
}

impl ProviderRequest {
    pub fn build(prompt: &ChatPrompt, provider: ProviderName) -> ProviderRequest {
        match provider {
            ProviderName::Gemini => return ProviderRequest::Primary(build_primary(prompt)),
            ProviderName::OpenRouter => {
                return ProviderRequest::Secondary(build_secondary(prompt))
            }
        }
    }

    pub fn provider(&self) -> ProviderName {
        match self {
            ProviderRequest::Primary(_) => return ProviderName::Gemini,
            ProviderRequest::Secondary(_) => return ProviderName::OpenRouter,
        }
    }
}

fn build_primary(prompt: &ChatPrompt) -> PrimaryRequest {
    let mut contents = prompt
        .history
        .iter()
        .map(|turn| {
            let role = match turn.sender {
                Sender::User => "user",
                Sender::Agent => "model",
            };
            return PrimaryContent::text(Some(role), &turn.text);
        })
        .collect::<Vec<PrimaryContent>>();

    contents.push(PrimaryContent::text(Some("user"), &prompt.message));

    return PrimaryRequest {
        system_instruction: PrimaryContent::text(None, &prompt.system_instruction),
        contents,
    };
}

fn build_secondary(prompt: &ChatPrompt) -> SecondaryRequest {
    let mut messages = vec![SecondaryMessage {
        role: "system".to_string(),
        content: prompt.system_instruction.to_string(),
    }];

    messages.extend(prompt.history.iter().map(|turn| {
        let role = match turn.sender {
            Sender::User => "user",
            Sender::Agent => "assistant",
        };
        return SecondaryMessage {
            role: role.to_string(),
            content: turn.text.to_string(),
        };
    }));

    messages.push(SecondaryMessage {
        role: "user".to_string(),
        content: prompt.message.to_string(),
    });

    return SecondaryRequest { messages };
}
