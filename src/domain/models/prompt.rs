use super::ConversationTurn;

/// Everything a provider needs to answer the next turn. The pending message
/// is kept apart from `history` and is only appended when a request is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatPrompt {
    pub history: Vec<ConversationTurn>,
    pub message: String,
    pub system_instruction: String,
}

impl ChatPrompt {
    pub fn new(
        history: Vec<ConversationTurn>,
        message: &str,
        system_instruction: &str,
    ) -> ChatPrompt {
        return ChatPrompt {
            history,
            message: message.to_string(),
            system_instruction: system_instruction.to_string(),
        };
    }
}
