//! Conversation history storage
//!
//! Conversations are id-keyed, append-only lists of question/answer turns.
//! Storage sits behind the [`ConversationStore`] trait so handlers receive it
//! through application state rather than reaching for a global map.

use crate::types::{AppError, Conversation, Result, Turn};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage for conversation records.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create and persist an empty conversation with a fresh UUID v4 id.
    async fn create(&self) -> Conversation;

    /// Fetch a snapshot of a conversation.
    async fn get(&self, id: &str) -> Option<Conversation>;

    /// Insert or replace a conversation record.
    async fn put(&self, conversation: Conversation);

    /// Atomically append a turn and bump `updated_at`.
    ///
    /// Returns the updated record, or `NotFound` if the id is unknown.
    async fn append(&self, id: &str, question: &str, answer: &str) -> Result<Conversation>;
}

/// Process-lifetime conversation store. Nothing is evicted.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conversations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.read().is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self) -> Conversation {
        let conversation = Conversation::new(uuid::Uuid::new_v4().to_string());
        self.conversations
            .write()
            .insert(conversation.id.clone(), conversation.clone());

        tracing::info!(conversation_id = %conversation.id, "Created conversation");
        conversation
    }

    async fn get(&self, id: &str) -> Option<Conversation> {
        self.conversations.read().get(id).cloned()
    }

    async fn put(&self, conversation: Conversation) {
        self.conversations
            .write()
            .insert(conversation.id.clone(), conversation);
    }

    async fn append(&self, id: &str, question: &str, answer: &str) -> Result<Conversation> {
        let mut conversations = self.conversations.write();
        let conversation = conversations
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

        // Wall clocks can step backwards; history timestamps must not.
        let timestamp = Utc::now().max(conversation.updated_at);

        conversation.history.push(Turn {
            question: question.to_string(),
            answer: answer.to_string(),
            timestamp,
        });
        conversation.updated_at = timestamp;

        Ok(conversation.clone())
    }
}

/// Render the last `window` turns as plain-text context for a follow-up question.
///
/// Returns an empty string when there is no history or the window is zero.
pub fn format_history_for_prompt(conversation: &Conversation, window: usize) -> String {
    let skip = conversation.history.len().saturating_sub(window);

    conversation
        .history
        .iter()
        .skip(skip)
        .map(|turn| format!("Q: {}\nA: {}", turn.question, turn.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the research topic for a follow-up question.
///
/// Prior turns are appended as context below the question itself.
pub fn topic_with_context(question: &str, conversation: &Conversation, window: usize) -> String {
    let context = format_history_for_prompt(conversation, window);
    if context.is_empty() {
        question.to_string()
    } else {
        format!("{}\nContext:\n{}", question, context)
    }
}
