//! Chat Assistant
//!
//! Keeps a running transcript per session and turns each customer question into a
//! language-model request framed with the restaurant and its live menu.
//! Faults never reach the caller: the transcript gets a canned apology.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::assistant::{ChatRole, Content, LanguageModel};

/// Reply appended when the model cannot be reached
pub const FALLBACK_REPLY: &str = "ขออภัยครับ ผมไม่สามารถเชื่อมต่อได้ในขณะนี้";

/// Reply appended when the model answers with no text
pub const EMPTY_REPLY: &str = "ขออภัยครับ ระบบขัดข้องชั่วคราว";

/// One message in the transcript
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// What happened to a question
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    /// The model (or the fallback) replied
    Answered(ChatTurn),
    /// Blank input
    Ignored,
    /// Another question is still being answered
    Busy,
}

#[derive(Debug, Default)]
struct Conversation {
    turns: Vec<ChatTurn>,
    thinking: bool,
}

/// One transcript per session id
pub struct ChatAssistant {
    model: Option<Arc<dyn LanguageModel>>,
    restaurant_name: String,
    conversations: Mutex<HashMap<String, Conversation>>,
}

/// Releases a conversation whose question was never answered
///
/// Dropping the `ask` future mid-request removes the unanswered question and
/// clears the thinking flag.
struct PendingQuestion<'a> {
    conversations: &'a Mutex<HashMap<String, Conversation>>,
    session_id: &'a str,
    answered: bool,
}

impl Drop for PendingQuestion<'_> {
    fn drop(&mut self) {
        if self.answered {
            return;
        }
        let mut conversations = self.conversations.lock();
        if let Some(conversation) = conversations.get_mut(self.session_id) {
            conversation.thinking = false;
            if conversation.turns.last().map(|t| t.role) == Some(ChatRole::User) {
                conversation.turns.pop();
            }
        }
        tracing::debug!(session = %self.session_id, "Abandoned assistant question");
    }
}

impl ChatAssistant {
    /// `model` is `None` when no API key is configured
    pub fn new(model: Option<Arc<dyn LanguageModel>>, restaurant_name: impl Into<String>) -> Self {
        Self {
            model,
            restaurant_name: restaurant_name.into(),
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_thinking(&self, session_id: &str) -> bool {
        self.conversations
            .lock()
            .get(session_id)
            .map_or(false, |c| c.thinking)
    }

    pub fn transcript(&self, session_id: &str) -> Vec<ChatTurn> {
        self.conversations
            .lock()
            .get(session_id)
            .map(|c| c.turns.clone())
            .unwrap_or_default()
    }

    /// Drop a session's transcript
    pub fn forget(&self, session_id: &str) {
        self.conversations.lock().remove(session_id);
    }

    /// Static framing plus the live menu
    pub fn system_prompt(&self, menu: &str) -> String {
        format!(
            "คุณคือผู้ช่วย AI ประจำร้าน \"{}\" ร้านอาหารและเครื่องดื่มชั้นนำในพะเยา\n\
             เมนูของร้านเรามี: {}\n\
             จงตอบคำถามลูกค้าอย่างสุภาพและน่าประทับใจ",
            self.restaurant_name, menu
        )
    }

    /// Ask a question about the menu in `session_id`'s conversation
    ///
    /// `menu` is the catalog rendered for the prompt at the time of asking.
    pub async fn ask(&self, session_id: &str, message: &str, menu: &str) -> AskOutcome {
        let message = message.trim();
        if message.is_empty() {
            return AskOutcome::Ignored;
        }

        let history = {
            let mut conversations = self.conversations.lock();
            let conversation = conversations.entry(session_id.to_string()).or_default();
            if conversation.thinking {
                return AskOutcome::Busy;
            }
            let history = conversation.turns.clone();
            conversation.turns.push(ChatTurn {
                role: ChatRole::User,
                text: message.to_string(),
            });
            conversation.thinking = true;
            history
        };
        let mut pending = PendingQuestion {
            conversations: &self.conversations,
            session_id,
            answered: false,
        };

        let mut contents = Vec::with_capacity(history.len() + 2);
        contents.push(Content::user(self.system_prompt(menu)));
        contents.extend(history.into_iter().map(|t| Content {
            role: t.role,
            text: t.text,
        }));
        contents.push(Content::user(message));

        let text = match &self.model {
            Some(model) => match model.generate(&contents).await {
                Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "Assistant request failed");
                    FALLBACK_REPLY.to_string()
                }
            },
            None => {
                tracing::debug!("Assistant has no model configured");
                FALLBACK_REPLY.to_string()
            }
        };

        let reply = ChatTurn {
            role: ChatRole::Model,
            text,
        };
        {
            let mut conversations = self.conversations.lock();
            let conversation = conversations.entry(session_id.to_string()).or_default();
            conversation.turns.push(reply.clone());
            conversation.thinking = false;
            pending.answered = true;
        }

        AskOutcome::Answered(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantError;
    use async_trait::async_trait;
    use std::time::Duration;

    const TABLE: &str = "table-1";

    /// Records every request and replies with a fixed result
    struct StubModel {
        reply: Result<String, ()>,
        delay: Duration,
        seen: Mutex<Vec<Vec<Content>>>,
    }

    impl StubModel {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn slow(text: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                delay,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    fn assistant_with(stub: &Arc<StubModel>) -> ChatAssistant {
        let model: Arc<dyn LanguageModel> = stub.clone();
        ChatAssistant::new(Some(model), "Homcha")
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn generate(&self, contents: &[Content]) -> Result<String, AssistantError> {
            self.seen.lock().push(contents.to_vec());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone().map_err(|_| AssistantError::Unavailable)
        }
    }

    #[tokio::test]
    async fn test_answer_is_appended() {
        let stub = StubModel::ok("Thai tea is 45 baht");
        let assistant = assistant_with(&stub);

        let outcome = assistant
            .ask(TABLE, "How much is Thai tea?", "Thai tea ราคา 45 บาท ()")
            .await;
        assert_eq!(
            outcome,
            AskOutcome::Answered(ChatTurn {
                role: ChatRole::Model,
                text: "Thai tea is 45 baht".to_string()
            })
        );

        let transcript = assistant.transcript(TABLE);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert!(!assistant.is_thinking(TABLE));
    }

    #[tokio::test]
    async fn test_failure_yields_fallback() {
        let assistant = assistant_with(&StubModel::failing());

        let outcome = assistant.ask(TABLE, "hello", "").await;
        match outcome {
            AskOutcome::Answered(turn) => assert_eq!(turn.text, FALLBACK_REPLY),
            other => panic!("Expected answer, got {:?}", other),
        }
        assert_eq!(assistant.transcript(TABLE).len(), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_yields_fallback() {
        let assistant = ChatAssistant::new(None, "Homcha");
        assert!(!assistant.is_configured());

        match assistant.ask(TABLE, "hello", "").await {
            AskOutcome::Answered(turn) => assert_eq!(turn.text, FALLBACK_REPLY),
            other => panic!("Expected answer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let assistant = assistant_with(&StubModel::ok("  "));
        match assistant.ask(TABLE, "hello", "").await {
            AskOutcome::Answered(turn) => assert_eq!(turn.text, EMPTY_REPLY),
            other => panic!("Expected answer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let stub = StubModel::ok("x");
        let assistant = assistant_with(&stub);

        assert_eq!(assistant.ask(TABLE, "   ", "").await, AskOutcome::Ignored);
        assert!(assistant.transcript(TABLE).is_empty());
        assert!(stub.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_busy_while_thinking() {
        let assistant = Arc::new(assistant_with(&StubModel::slow("x", Duration::from_millis(100))));

        let first = {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move { assistant.ask(TABLE, "first", "").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(assistant.is_thinking(TABLE));
        assert_eq!(assistant.ask(TABLE, "second", "").await, AskOutcome::Busy);
        // another table is not blocked
        assert!(matches!(
            assistant.ask("table-2", "hello", "").await,
            AskOutcome::Answered(_)
        ));

        assert!(matches!(first.await.unwrap(), AskOutcome::Answered(_)));
        assert_eq!(assistant.transcript(TABLE).len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_question_releases_conversation() {
        let assistant = Arc::new(assistant_with(&StubModel::slow("late", Duration::from_millis(200))));

        let task = {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move { assistant.ask(TABLE, "anyone there?", "").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(assistant.transcript(TABLE).len(), 1);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert!(!assistant.is_thinking(TABLE));
        assert!(assistant.transcript(TABLE).is_empty());

        assert!(matches!(
            assistant.ask(TABLE, "hello again", "").await,
            AskOutcome::Answered(_)
        ));
        assert_eq!(assistant.transcript(TABLE).len(), 2);
    }

    #[tokio::test]
    async fn test_transcripts_are_per_session() {
        let assistant = assistant_with(&StubModel::ok("answer"));

        assistant.ask("alice", "my question", "").await;

        assert_eq!(assistant.transcript("alice").len(), 2);
        assert!(assistant.transcript("bob").is_empty());

        assistant.forget("alice");
        assert!(assistant.transcript("alice").is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_history() {
        let stub = StubModel::ok("answer");
        let assistant = assistant_with(&stub);

        assistant.ask(TABLE, "first", "MENU").await;
        assistant.ask(TABLE, "second", "MENU").await;

        let seen = stub.seen.lock();
        let last = &seen[1];
        // prompt, first, answer, second
        assert_eq!(last.len(), 4);
        assert!(last[0].text.contains("Homcha"));
        assert!(last[0].text.contains("MENU"));
        assert_eq!(last[1].text, "first");
        assert_eq!(last[2].role, ChatRole::Model);
        assert_eq!(last[3].text, "second");
    }
}
