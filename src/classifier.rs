//! Intent classifier
//!
//! The LLM is asked to answer with one of three labels. Its reply is then
//! mapped onto an [`Intent`] by substring matching, so replies such as
//! "Categoria: contas a pagar." still route correctly.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intent {
    #[serde(rename = "CONTAS_A_PAGAR")]
    AccountsPayable,
    #[serde(rename = "EXTRATO_CLIENTE")]
    CustomerStatement,
    #[serde(rename = "OUTRO")]
    Other,
}

/// System prompt for the classification call
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "Você é uma assistente que identifica intenções e interpreta perguntas relacionadas a dados financeiros do Sienge. \
Classifique a pergunta do usuário em exatamente uma das categorias: \
CONTAS_A_PAGAR (contas, boletos ou títulos a pagar), \
EXTRATO_CLIENTE (extrato financeiro de cliente) ou \
OUTRO (qualquer outro assunto). \
Responda somente com o nome da categoria.";

pub const CLASSIFIER_MAX_TOKENS: u32 = 256;
pub const CLASSIFIER_TEMPERATURE: f32 = 0.0;

impl Intent {
    /// Map a free-form label onto an intent. Accounts payable wins when a
    /// label mentions both categories.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_uppercase();

        if label.contains("CONTAS") && label.contains("PAGAR") {
            Intent::AccountsPayable
        } else if label.contains("EXTRATO") {
            Intent::CustomerStatement
        } else {
            Intent::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intent::AccountsPayable => "CONTAS_A_PAGAR",
            Intent::CustomerStatement => "EXTRATO_CLIENTE",
            Intent::Other => "OUTRO",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
