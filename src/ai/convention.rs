//! Model calling conventions
//!
//! Search-oriented and reasoning models reject system messages and sampling
//! parameters, so they get the prompt as a lone user message. Every other
//! model gets a system message plus fixed sampling for reproducible output.

use super::provider::{ChatMessage, ChatRequest};
use crate::constants::llm::USER_ONLY_MODEL_PREFIXES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatConvention {
    /// User message only; no system prompt, temperature, seed or token limit
    UserOnly,
    /// System + user messages with token limit, temperature and seed
    SystemAndUser,
}

/// Sampling parameters for the system-role convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
    pub seed: i64,
}

impl ChatConvention {
    /// Pick the convention from the model identifier's prefix
    pub fn for_model(model: &str) -> Self {
        if USER_ONLY_MODEL_PREFIXES
            .iter()
            .any(|prefix| model.starts_with(prefix))
        {
            Self::UserOnly
        } else {
            Self::SystemAndUser
        }
    }

    pub fn build_request(
        &self,
        model: &str,
        prompt: &str,
        system_prompt: &str,
        sampling: Sampling,
    ) -> ChatRequest {
        match self {
            Self::UserOnly => ChatRequest {
                model: model.to_string(),
                messages: vec![ChatMessage::user(prompt)],
                max_tokens: None,
                temperature: None,
                seed: None,
            },
            Self::SystemAndUser => ChatRequest {
                model: model.to_string(),
                messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)],
                max_tokens: Some(sampling.max_tokens),
                temperature: Some(sampling.temperature),
                seed: Some(sampling.seed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::Role;

    const SAMPLING: Sampling = Sampling {
        max_tokens: 4096,
        temperature: 0.5,
        seed: 666,
    };

    #[test]
    fn test_convention_by_prefix() {
        assert_eq!(ChatConvention::for_model("o1-mini"), ChatConvention::UserOnly);
        assert_eq!(ChatConvention::for_model("o1-preview"), ChatConvention::UserOnly);
        assert_eq!(
            ChatConvention::for_model("gpt-4o-search-preview"),
            ChatConvention::UserOnly
        );
        assert_eq!(
            ChatConvention::for_model("gpt-4.1-2025-04-14"),
            ChatConvention::SystemAndUser
        );
        assert_eq!(ChatConvention::for_model("gpt-4o"), ChatConvention::SystemAndUser);
        // prefix match, not substring
        assert_eq!(ChatConvention::for_model("o1"), ChatConvention::SystemAndUser);
    }

    #[test]
    fn test_user_only_request() {
        let request = ChatConvention::UserOnly.build_request(
            "gpt-4o-search-preview",
            "What does acme.co sell?",
            "ignored",
            SAMPLING,
        );
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.seed.is_none());
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn test_system_and_user_request() {
        let request = ChatConvention::SystemAndUser.build_request(
            "gpt-4.1-2025-04-14",
            "Write an overview",
            "You are an AI publishing assistant",
            SAMPLING,
        );
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are an AI publishing assistant");
        assert_eq!(request.messages[1].content, "Write an overview");
        assert_eq!(request.seed, Some(666));
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(4096));
    }
}
