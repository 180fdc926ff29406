//! Message relay
//!
//! Forwards user text to the chat model. The plain relay never fails: any
//! upstream problem is logged and replaced by a fixed reply.

use crate::attachments::{attach_files, process_files, IncomingFile};
use crate::error::NexusError;
use crate::openai::{ChatMessage, ChatModel, ChatRequest};
use crate::Result;
use std::sync::Arc;
use tracing::{error, info};

pub const RELAY_SYSTEM_PROMPT: &str = "Você é um assistente útil e direto.";
pub const RELAY_ERROR_REPLY: &str = "Erro ao se comunicar com a OpenAI.";

pub struct MessageRelay {
    model: Arc<dyn ChatModel>,
    model_name: String,
}

impl MessageRelay {
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    /// Relay one message and return the reply text, or [`RELAY_ERROR_REPLY`]
    pub async fn relay(&self, user: &str, text: &str) -> String {
        info!("📩 Message from user '{}': {}", user, text);

        let request = ChatRequest::new(
            self.model_name.clone(),
            vec![
                ChatMessage::system(RELAY_SYSTEM_PROMPT),
                ChatMessage::user(text),
            ],
        );

        match self.model.complete(&request).await {
            Ok(reply) => {
                info!("🤖 Reply: {}", reply);
                reply
            }
            Err(e) => {
                error!("❌ Failed to relay message: {}", e);
                RELAY_ERROR_REPLY.to_string()
            }
        }
    }

    /// Forward a full transcript, with attachments folded into its last message
    pub async fn chat(&self, messages: Vec<ChatMessage>, files: &[IncomingFile]) -> Result<String> {
        if messages.is_empty() {
            return Err(NexusError::InvalidRequest(
                "transcript has no messages".to_string(),
            ));
        }

        info!("Received chat request with {} messages", messages.len());

        let processed = process_files(files);
        let messages = attach_files(messages, &processed);

        self.model
            .complete(&ChatRequest::new(self.model_name.clone(), messages))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::MessageContent;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingModel {
        reply: Option<String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(vec![]),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                seen: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| NexusError::LlmError("upstream down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_relay_sends_system_prompt_and_text() {
        let model = RecordingModel::replying("Olá!");
        let relay = MessageRelay::new(model.clone(), "gpt-3.5-turbo");

        assert_eq!(relay.relay("u1", "oi").await, "Olá!");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-3.5-turbo");
        assert_eq!(seen[0].messages[0], ChatMessage::system(RELAY_SYSTEM_PROMPT));
        assert_eq!(seen[0].messages[1], ChatMessage::user("oi"));
    }

    #[tokio::test]
    async fn test_relay_hides_upstream_errors() {
        let relay = MessageRelay::new(RecordingModel::failing(), "gpt-3.5-turbo");
        assert_eq!(relay.relay("u1", "oi").await, RELAY_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_transcript() {
        let model = RecordingModel::replying("unused");
        let relay = MessageRelay::new(model.clone(), "gpt-3.5-turbo");

        let result = relay.chat(vec![], &[]).await;
        assert!(matches!(result, Err(NexusError::InvalidRequest(_))));
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_folds_attachments_into_last_message() {
        let model = RecordingModel::replying("resumo");
        let relay = MessageRelay::new(model.clone(), "gpt-3.5-turbo");

        let files = vec![IncomingFile {
            name: "nota.txt".to_string(),
            mime_type: "text/plain".to_string(),
            data: "b2k=".to_string(),
        }];
        let reply = relay
            .chat(vec![ChatMessage::user("resuma o arquivo")], &files)
            .await
            .unwrap();
        assert_eq!(reply, "resumo");

        let seen = model.seen.lock().unwrap();
        let MessageContent::Text(text) = &seen[0].messages[0].content else {
            panic!("expected text content");
        };
        assert!(text.contains("nota.txt"));
        assert!(text.contains("oi"));
    }
}
