//! Context-window assembly for gateway calls.
//!
//! Builds the ordered role/text list sent to the completion gateway from a
//! conversation's stored history plus the incoming user turn. Truncation
//! drops oldest complete turns first and never splits a message, so the
//! result is a deterministic function of the stored messages, the new text
//! and the configured budget.

use banter_models::{Message, MessageRole};

use crate::client::ChatTurn;

/// Context assembly configuration.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// System prompt prepended to every context window.
    pub system_prompt: String,
    /// Maximum number of prior turns to consider (most recent first).
    pub max_turns: usize,
    /// Token budget for the whole window, estimated at len/4 + 1 per turn.
    pub max_context_tokens: usize,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and friendly AI assistant. \
     Provide clear, concise, and helpful responses to user questions.";

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_turns: 10,
            max_context_tokens: 3_000,
        }
    }
}

/// Assembles context windows under a fixed configuration.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(ContextConfig::default())
    }

    /// Build the context window: system turn, bounded history suffix in
    /// storage order, then the new user turn.
    pub fn build(&self, history: &[Message], new_user_text: &str) -> Vec<ChatTurn> {
        let system = ChatTurn::system(self.config.system_prompt.clone());
        let new_turn = ChatTurn::user(new_user_text);

        // The system prompt and the new turn are always included; history
        // fits into whatever budget remains.
        let reserved = estimate_tokens(&system.content) + estimate_tokens(&new_turn.content);
        let budget = self.config.max_context_tokens.saturating_sub(reserved);

        let recent = if history.len() > self.config.max_turns {
            &history[history.len() - self.config.max_turns..]
        } else {
            history
        };

        // Walk from the newest turn backwards, keeping whole turns while
        // they fit. Stopping at the first overflow keeps a contiguous
        // suffix, which is exactly "drop oldest complete turns first".
        let mut kept = 0;
        let mut used = 0;
        for message in recent.iter().rev() {
            let tokens = estimate_tokens(&message.content);
            if used + tokens > budget {
                break;
            }
            used += tokens;
            kept += 1;
        }

        let mut turns = Vec::with_capacity(kept + 2);
        turns.push(system);
        for message in &recent[recent.len() - kept..] {
            turns.push(match message.role {
                MessageRole::User => ChatTurn::user(message.content.clone()),
                MessageRole::Assistant => ChatTurn::assistant(message.content.clone()),
            });
        }
        turns.push(new_turn);
        turns
    }
}

fn estimate_tokens(text: &str) -> usize {
    text.len() / 4 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(seq: u64, role: MessageRole, content: &str) -> Message {
        Message::new("conv-1", seq, role, content)
    }

    fn history(contents: &[&str]) -> Vec<Message> {
        contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let role = if i % 2 == 0 {
                    MessageRole::User
                } else {
                    MessageRole::Assistant
                };
                message(i as u64, role, content)
            })
            .collect()
    }

    #[test]
    fn test_system_first_new_turn_last() {
        let assembler = ContextAssembler::with_default_config();
        let turns = assembler.build(&history(&["hello", "hi there"]), "how are you?");

        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, crate::client::Role::System);
        assert_eq!(turns[1].content, "hello");
        assert_eq!(turns[2].content, "hi there");
        assert_eq!(turns.last().unwrap().content, "how are you?");
        assert_eq!(turns.last().unwrap().role, crate::client::Role::User);
    }

    #[test]
    fn test_empty_history() {
        let assembler = ContextAssembler::with_default_config();
        let turns = assembler.build(&[], "first message");
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn test_turn_cap_keeps_most_recent() {
        let config = ContextConfig {
            max_turns: 2,
            ..ContextConfig::default()
        };
        let assembler = ContextAssembler::new(config);
        let turns = assembler.build(&history(&["one", "two", "three", "four"]), "five");

        assert_eq!(turns.len(), 4);
        assert_eq!(turns[1].content, "three");
        assert_eq!(turns[2].content, "four");
    }

    #[test]
    fn test_token_budget_drops_oldest_whole_turns() {
        let config = ContextConfig {
            system_prompt: "sys".to_string(),
            max_turns: 10,
            // Room for the reserved turns plus roughly two short history turns.
            max_context_tokens: 10,
        };
        let assembler = ContextAssembler::new(config);
        let msgs = history(&["aaaaaaaa", "bbbbbbbb", "cccccccc"]);
        let turns = assembler.build(&msgs, "hi");

        // Whatever was kept must be a suffix of the history, intact.
        let kept: Vec<&str> = turns[1..turns.len() - 1]
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert!(kept.len() < msgs.len());
        let expected: Vec<&str> = msgs[msgs.len() - kept.len()..]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(kept, expected);
        // Never split: each kept turn matches a stored message exactly.
        for content in kept {
            assert!(msgs.iter().any(|m| m.content == content));
        }
    }

    #[test]
    fn test_deterministic() {
        let assembler = ContextAssembler::with_default_config();
        let msgs = history(&["alpha", "beta", "gamma"]);
        let first = assembler.build(&msgs, "delta");
        let second = assembler.build(&msgs, "delta");
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_turn_survives_zero_budget() {
        let config = ContextConfig {
            system_prompt: "sys".to_string(),
            max_turns: 10,
            max_context_tokens: 0,
        };
        let assembler = ContextAssembler::new(config);
        let turns = assembler.build(&history(&["old"]), "hi");

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, "hi");
    }
}
