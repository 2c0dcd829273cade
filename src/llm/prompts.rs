use crate::models::ChatMessage;

/// System prompt for classification (fixed vocabularies and output shape)
pub const SYSTEM_PROMPT: &str = r#"You are an expert customer service agent. You are to decide the customer sentiment in their conversation with a PA agent. The sentiment can only be one of three categories - positive, negative, neutral. You are also to decide if the issue is resolved or if a follow-up action is needed, answering "yes" or "no". Please also tag the conversation with one of five tags - either "claim" if the call is about a claim, "policy" if it is a question about the insurance policy, "tech" if it is about not being able to log in to online services, "pre-auth" if a member wants a treatment authorised, or "other" if the call cannot be categorised. Please provide the answer in dictionary format eg {"sentiment": "neutral", "follow_up_needed": "yes", "tag": "claim"}. Please only provide the dictionary response and no explanation."#;

/// Build the user message for a normalized transcript
pub fn build_transcript_prompt(raw: &str) -> String {
    format!("Here is the conversation transcript:\n{}", raw)
}

/// The two-message conversation sent for one transcript
pub fn build_classification_messages(raw: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_transcript_prompt(raw)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_system_prompt_names_every_key_and_tag() {
        for needle in [
            "sentiment",
            "follow_up_needed",
            "tag",
            "positive",
            "negative",
            "neutral",
            "\"claim\"",
            "\"policy\"",
            "\"tech\"",
            "\"pre-auth\"",
            "\"other\"",
        ] {
            assert!(SYSTEM_PROMPT.contains(needle), "missing {}", needle);
        }
    }

    #[test]
    fn test_build_classification_messages() {
        let messages = build_classification_messages("\nPA Agent: Hi.");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "Here is the conversation transcript:\n\nPA Agent: Hi."
        );
    }
}
