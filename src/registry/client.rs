//! Cliente da API de consulta de CNPJ.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::cnpj::Cnpj;
use crate::types::config::RegistryConfig;
use crate::types::record::{Record, NOT_AVAILABLE};
use crate::{ConsultaError, ConsultaResult};

/// Tamanho máximo do corpo de erro escrito no log.
const MAX_LOGGED_BODY: usize = 200;

/// Falha de uma consulta remota.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A API respondeu 400: CNPJ inválido ou inexistente.
    #[error("CNPJ desconhecido pela API")]
    UnknownId,

    /// Qualquer outro status de erro.
    #[error("{status} - {body}")]
    Status { status: StatusCode, body: String },

    /// Falha de rede ou de transporte.
    #[error("{0}")]
    Transport(String),

    /// Resposta de sucesso com corpo que não é JSON.
    #[error("resposta inválida: {0}")]
    InvalidBody(String),
}

/// Dados da empresa extraídos da resposta da API.
///
/// Cada campo é opcional na resposta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyData {
    /// `company.name`.
    pub business_name: Option<String>,
    /// `address.state`.
    pub region_code: Option<String>,
    /// `registrations[0].number`.
    pub registration_number: Option<String>,
}

impl CompanyData {
    /// Extrai os campos de interesse do JSON da API.
    pub fn from_json(body: &Value) -> Self {
        Self {
            business_name: text_at(body, "/company/name"),
            region_code: text_at(body, "/address/state"),
            registration_number: text_at(body, "/registrations/0/number"),
        }
    }

    /// Monta o registro, com "N/A" nos campos ausentes.
    pub fn into_record(self, cnpj: &Cnpj, queried_at: NaiveDateTime) -> Record {
        let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Record::new(
            cnpj.as_str(),
            or_na(self.business_name),
            or_na(self.region_code),
            or_na(self.registration_number),
            queried_at,
        )
    }
}

/// Lê um valor escalar como texto; `null`, objetos e listas contam como ausentes.
fn text_at(body: &Value, pointer: &str) -> Option<String> {
    match body.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Fonte remota de dados de CNPJ.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Nome do cliente (para logs).
    fn name(&self) -> &str;

    /// Consulta um CNPJ.
    async fn fetch(&self, cnpj: &Cnpj) -> Result<CompanyData, FetchError>;
}

/// Cliente HTTP da API (`GET <base_url>/<cnpj>`).
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistryClient {
    /// Cria o cliente a partir da configuração.
    pub fn new(config: &RegistryConfig) -> ConsultaResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ConsultaError::config(format!("user_agent inválido: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ConsultaError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL base normalizada (sem barra final).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, cnpj: &Cnpj) -> String {
        format!("{}/{}", self.base_url, cnpj)
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, cnpj: &Cnpj) -> Result<CompanyData, FetchError> {
        let url = self.url_for(cnpj);
        tracing::debug!(url = %url, "Consultando API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            let json: Value =
                serde_json::from_str(&body).map_err(|e| FetchError::InvalidBody(e.to_string()))?;
            return Ok(CompanyData::from_json(&json));
        }

        if status == StatusCode::BAD_REQUEST {
            tracing::debug!(cnpj = %cnpj, "API respondeu 400");
            return Err(FetchError::UnknownId);
        }

        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(MAX_LOGGED_BODY).collect();
        tracing::warn!(status = %status, cnpj = %cnpj, body = %preview, "Erro na API");
        Err(FetchError::Status { status, body })
    }
}
