//! Intent-routed financial queries
//!
//! INPUT → CLASSIFY (LLM) → DISPATCH (Sienge) → OUTCOME

use crate::classifier::{
    Intent, CLASSIFIER_MAX_TOKENS, CLASSIFIER_SYSTEM_PROMPT, CLASSIFIER_TEMPERATURE,
};
use crate::error::NexusError;
use crate::models::{Classification, QueryOutcome};
use crate::openai::{ChatMessage, ChatModel, ChatRequest};
use crate::sienge::FinancialData;
use crate::Result;
use std::sync::Arc;
use tracing::info;

pub const UNSUPPORTED_QUERY_MESSAGE: &str = "Não identifiquei uma consulta suportada. \
Pergunte sobre contas a pagar ou extrato de cliente.";

pub struct IntentRouter {
    model: Arc<dyn ChatModel>,
    erp: Arc<dyn FinancialData>,
    model_name: String,
}

impl IntentRouter {
    pub fn new(
        model: Arc<dyn ChatModel>,
        erp: Arc<dyn FinancialData>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            model,
            erp,
            model_name: model_name.into(),
        }
    }

    pub async fn classify(&self, question: &str) -> Result<Classification> {
        let request = ChatRequest::new(
            self.model_name.clone(),
            vec![
                ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
                ChatMessage::user(question),
            ],
        )
        .max_tokens(CLASSIFIER_MAX_TOKENS)
        .temperature(CLASSIFIER_TEMPERATURE);

        let label = self.model.complete(&request).await?;
        let intent = Intent::from_label(&label);

        info!(label = %label, intent = %intent, "Query classified");

        Ok(Classification { label, intent })
    }

    pub async fn answer(&self, question: &str, empresa: Option<&str>) -> Result<QueryOutcome> {
        if question.trim().is_empty() {
            return Err(NexusError::InvalidRequest("question is empty".to_string()));
        }

        let Classification { label, intent } = self.classify(question).await?;

        let (data, message) = match intent {
            Intent::AccountsPayable => (Some(self.erp.accounts_payable(empresa).await?), None),
            Intent::CustomerStatement => {
                (Some(self.erp.customer_statement(empresa).await?), None)
            }
            Intent::Other => (None, Some(UNSUPPORTED_QUERY_MESSAGE.to_string())),
        };

        Ok(QueryOutcome {
            intent,
            label,
            data,
            message,
        })
    }
}
