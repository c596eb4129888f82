use anyhow::Result;

use super::PrimaryContent;
use super::ProviderRequest;
use super::SecondaryMessage;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ConversationTurn;
use crate::domain::models::ProviderName;

fn interview_prompt() -> ChatPrompt {
    return ChatPrompt::new(
        vec![
            ConversationTurn::agent("Welcome! Tell me about yourself."),
            ConversationTurn::user("I studied mechanical engineering."),
            ConversationTurn::agent("How would you handle an angry customer?"),
        ],
        "I would listen first.",
        "You are an interviewer for a workshop supervisor role.",
    );
}

fn texts(contents: &[PrimaryContent]) -> Vec<String> {
    return contents
        .iter()
        .map(|content| return content.parts[0].text.to_string())
        .collect();
}

#[test]
fn it_builds_primary_request_in_history_order() {
    let prompt = interview_prompt();
    let req = match ProviderRequest::build(&prompt, ProviderName::Gemini) {
        ProviderRequest::Primary(req) => req,
        ProviderRequest::Secondary(_) => panic!("Expected a primary request"),
    };

    assert_eq!(
        texts(&req.contents),
        vec![
            "Welcome! Tell me about yourself.".to_string(),
            "I studied mechanical engineering.".to_string(),
            "How would you handle an angry customer?".to_string(),
            "I would listen first.".to_string(),
        ]
    );

    let roles = req
        .contents
        .iter()
        .map(|content| return content.role.clone().unwrap())
        .collect::<Vec<String>>();
    assert_eq!(roles, vec!["model", "user", "model", "user"]);

    assert_eq!(req.system_instruction.role, None);
    assert_eq!(
        req.system_instruction.parts[0].text,
        "You are an interviewer for a workshop supervisor role."
    );
}

#[test]
fn it_builds_secondary_request_with_leading_system_turn() {
    let prompt = interview_prompt();
    let req = match ProviderRequest::build(&prompt, ProviderName::OpenRouter) {
        ProviderRequest::Secondary(req) => req,
        ProviderRequest::Primary(_) => panic!("Expected a secondary request"),
    };

    assert_eq!(
        req.messages,
        vec![
            SecondaryMessage {
                role: "system".to_string(),
                content: "You are an interviewer for a workshop supervisor role.".to_string(),
            },
            SecondaryMessage {
                role: "assistant".to_string(),
                content: "Welcome! Tell me about yourself.".to_string(),
            },
            SecondaryMessage {
                role: "user".to_string(),
                content: "I studied mechanical engineering.".to_string(),
            },
            SecondaryMessage {
                role: "assistant".to_string(),
                content: "How would you handle an angry customer?".to_string(),
            },
            SecondaryMessage {
                role: "user".to_string(),
                content: "I would listen first.".to_string(),
            },
        ]
    );
}

#[test]
fn it_appends_latest_message_to_empty_history() {
    let prompt = ChatPrompt::new(vec![], "Hello", "Be brief.");

    let primary = ProviderRequest::build(&prompt, ProviderName::Gemini);
    let secondary = ProviderRequest::build(&prompt, ProviderName::OpenRouter);

    match primary {
        ProviderRequest::Primary(req) => assert_eq!(texts(&req.contents), vec!["Hello"]),
        ProviderRequest::Secondary(_) => panic!("Expected a primary request"),
    }
    match secondary {
        ProviderRequest::Secondary(req) => {
            assert_eq!(req.messages.len(), 2);
            assert_eq!(req.messages[1].content, "Hello");
        }
        ProviderRequest::Primary(_) => panic!("Expected a secondary request"),
    }
}

#[test]
fn it_keeps_duplicate_turns() {
    let prompt = ChatPrompt::new(
        vec![ConversationTurn::user("Yes"), ConversationTurn::user("Yes")],
        "Yes",
        "",
    );

    match ProviderRequest::build(&prompt, ProviderName::Gemini) {
        ProviderRequest::Primary(req) => {
            assert_eq!(texts(&req.contents), vec!["Yes", "Yes", "Yes"])
        }
        ProviderRequest::Secondary(_) => panic!("Expected a primary request"),
    }
}

#[test]
fn it_serializes_primary_request_in_camel_case() -> Result<()> {
    let prompt = ChatPrompt::new(vec![ConversationTurn::agent("Hi")], "Hello", "Be kind.");
    let req = match ProviderRequest::build(&prompt, ProviderName::Gemini) {
        ProviderRequest::Primary(req) => req,
        ProviderRequest::Secondary(_) => panic!("Expected a primary request"),
    };

    let json = serde_json::to_string(&req)?;
    insta::assert_snapshot!(json, @r###"{"systemInstruction":{"parts":[{"text":"Be kind."}]},"contents":[{"role":"model","parts":[{"text":"Hi"}]},{"role":"user","parts":[{"text":"Hello"}]}]}"###);

    return Ok(());
}

#[test]
fn it_reports_target_provider() {
    let prompt = ChatPrompt::new(vec![], "Hello", "");
    assert_eq!(
        ProviderRequest::build(&prompt, ProviderName::Gemini).provider(),
        ProviderName::Gemini
    );
    assert_eq!(
        ProviderRequest::build(&prompt, ProviderName::OpenRouter).provider(),
        ProviderName::OpenRouter
    );
}
