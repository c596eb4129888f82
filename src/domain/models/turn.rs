use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// A single message in an assessment conversation. Turns are stored in the
/// order they happened and are never rewritten once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(sender: Sender, text: &str) -> ConversationTurn {
        return ConversationTurn {
            sender,
            text: text.to_string(),
        };
    }

    pub fn user(text: &str) -> ConversationTurn {
        return ConversationTurn::new(Sender::User, text);
    }

    pub fn agent(text: &str) -> ConversationTurn {
        return ConversationTurn::new(Sender::Agent, text);
    }
}
