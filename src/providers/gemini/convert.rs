//! Gemini request conversion helpers (pure functions)
//!
//! Gemini takes `user`/`model` turns only. System messages are folded into
//! the first user turn as `"{system}\n\n{user}"`.

use crate::types::{ChatMessage, MessageRole};

use super::types::Content;

pub fn build_contents(messages: &[ChatMessage]) -> Vec<Content> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    let mut pending_system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };

    let mut contents = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            MessageRole::System => {}
            MessageRole::User => {
                let text = match pending_system.take() {
                    Some(sys) if message.content.is_empty() => sys,
                    Some(sys) => format!("{sys}\n\n{}", message.content),
                    None => message.content.clone(),
                };
                contents.push(Content::text("user", text));
            }
            MessageRole::Assistant => {
                contents.push(Content::text("model", message.content.clone()));
            }
        }
    }

    // No user turn to attach to: the system text becomes the user turn.
    if let Some(sys) = pending_system {
        contents.insert(0, Content::text("user", sys));
    }

    contents
}
