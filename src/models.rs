//! Core data models shared by the services and the HTTP layer

use crate::attachments::IncomingFile;
use crate::classifier::Intent;
use crate::openai::ChatMessage;
use serde::{Deserialize, Deserializer, Serialize};

//
// ================= Message relay =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageReply {
    pub response: String,
}

//
// ================= Chat with attachments =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: Vec<IncomingFile>,
}

/// Treat an explicit `null` list the same as a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

//
// ================= Intent-routed query =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    #[serde(alias = "question")]
    pub pergunta: String,
    #[serde(default)]
    pub empresa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    /// Raw label as returned by the model
    pub label: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryOutcome {
    pub intent: Intent,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
