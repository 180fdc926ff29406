//! Sienge ERP client
//!
//! Read-only access to the finance endpoints. Every call acquires a fresh
//! token first; nothing is cached between calls.

use crate::config::SiengeConfig;
use crate::error::NexusError;
use crate::Result;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

pub const ACCOUNTS_PAYABLE_PATH: &str = "/accounts-payable/bills";
pub const CUSTOMER_STATEMENT_PATH: &str = "/customer-financial-statements";

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);
const QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Token fields accepted from the auth endpoint, in priority order
const TOKEN_FIELDS: &[&str] = &["access_token", "token", "accessToken"];

/// Read-only financial data source
#[async_trait]
pub trait FinancialData: Send + Sync {
    /// Accounts payable bills ("contas a pagar")
    async fn accounts_payable(&self, empresa: Option<&str>) -> Result<Value>;

    /// Customer financial statement ("extrato do cliente")
    async fn customer_statement(&self, empresa: Option<&str>) -> Result<Value>;
}

#[derive(Clone)]
pub struct SiengeClient {
    client: Client,
    base_url: String,
    user: Option<String>,
    pass: Option<String>,
}

impl SiengeClient {
    pub fn new(config: &SiengeConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            pass: config.pass.clone(),
        })
    }

    /// Exchange the configured credentials for a bearer token
    pub async fn fetch_token(&self) -> Result<String> {
        let (Some(user), Some(pass)) = (self.user.as_deref(), self.pass.as_deref()) else {
            return Err(NexusError::ConfigError(
                "SIENGE_USER or SIENGE_PASS not set in environment".to_string(),
            ));
        };

        let url = format!("{}/auth", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(user, Some(pass))
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                error!("Sienge auth request failed: {}", e);
                NexusError::SiengeError(format!("auth request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NexusError::SiengeError(format!(
                "auth returned {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| NexusError::SiengeError(format!("invalid auth response: {}", e)))?;

        extract_token(&body).ok_or_else(|| {
            NexusError::SiengeError("auth response did not contain a token".to_string())
        })
    }

    /// Authenticated GET returning the JSON body
    pub async fn get_with_token(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let token = self.fetch_token().await?;
        let url = format!("{}{}", self.base_url, path);

        info!(path, params = params.len(), "Querying Sienge");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .query(params)
            .timeout(QUERY_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                error!("Sienge request failed for {}: {}", path, e);
                NexusError::SiengeError(format!("request failed for {}: {}", path, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Sienge returned {} for {}: {}", status, path, body);
            return Err(NexusError::SiengeError(format!(
                "{} returned {}: {}",
                path, status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NexusError::SiengeError(format!("invalid JSON from {}: {}", path, e)))
    }
}

#[async_trait]
impl FinancialData for SiengeClient {
    async fn accounts_payable(&self, empresa: Option<&str>) -> Result<Value> {
        self.get_with_token(ACCOUNTS_PAYABLE_PATH, &empresa_params(empresa))
            .await
    }

    async fn customer_statement(&self, empresa: Option<&str>) -> Result<Value> {
        self.get_with_token(CUSTOMER_STATEMENT_PATH, &empresa_params(empresa))
            .await
    }
}

fn extract_token(body: &Value) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(|v| v.as_str()))
        .find(|token| !token.is_empty())
        .map(|token| token.to_string())
}

fn empresa_params(empresa: Option<&str>) -> Vec<(&'static str, String)> {
    match empresa.map(str::trim) {
        Some(e) if !e.is_empty() => vec![("empresa", e.to_string())],
        _ => vec![],
    }
}
