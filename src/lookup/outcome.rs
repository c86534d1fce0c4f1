//! Resultado de uma consulta.

use serde::Serialize;

use crate::types::Record;

/// De onde veio o registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Arquivo local (sem gastar cota).
    Cache,
    /// API remota.
    Remote,
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordSource::Cache => write!(f, "cache"),
            RecordSource::Remote => write!(f, "remote"),
        }
    }
}

/// Motivo de rejeição de uma consulta.
///
/// Toda rejeição encerra a consulta atual; nenhuma é repetida automaticamente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Entrada não tem 14 dígitos.
    InvalidId { input: String },
    /// Sem rede; nenhuma cota foi gasta.
    NoConnectivity,
    /// Cota da janela esgotada.
    RateLimited { retry_in_secs: u64 },
    /// A API não reconhece o CNPJ (HTTP 400). A cota foi gasta.
    UnknownId { cnpj: String },
    /// Outro erro da API ou de transporte, repassado como veio.
    RemoteError { detail: String },
}

impl Rejection {
    /// Identificador curto do motivo (para logs e saída JSON).
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::InvalidId { .. } => "invalid_id",
            Rejection::NoConnectivity => "no_connectivity",
            Rejection::RateLimited { .. } => "rate_limited",
            Rejection::UnknownId { .. } => "unknown_id",
            Rejection::RemoteError { .. } => "remote_error",
        }
    }

    /// Mensagem exibida ao usuário.
    pub fn message(&self) -> String {
        match self {
            Rejection::InvalidId { .. } => {
                "Por favor, digite um CNPJ válido de 14 dígitos.".to_string()
            }
            Rejection::NoConnectivity => {
                "Sem conexão com a internet. Verifique sua rede e tente novamente.".to_string()
            }
            Rejection::RateLimited { retry_in_secs } => format!(
                "Limite de consultas por minuto alcançado. Aguarde {}s...",
                retry_in_secs
            ),
            Rejection::UnknownId { .. } => {
                "CNPJ inválido ou inexistente. Verifique o número digitado.".to_string()
            }
            Rejection::RemoteError { detail } => format!("Erro: {}", detail),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Resultado final de uma consulta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Registro encontrado.
    Found { record: Record, source: RecordSource },
    /// Consulta rejeitada.
    Rejected(Rejection),
}

impl LookupOutcome {
    /// Registro, se encontrado.
    pub fn record(&self) -> Option<&Record> {
        match self {
            LookupOutcome::Found { record, .. } => Some(record),
            LookupOutcome::Rejected(_) => None,
        }
    }

    /// Rejeição, se houver.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            LookupOutcome::Found { .. } => None,
            LookupOutcome::Rejected(rejection) => Some(rejection),
        }
    }

    /// Origem do registro, se encontrado.
    pub fn source(&self) -> Option<RecordSource> {
        match self {
            LookupOutcome::Found { source, .. } => Some(*source),
            LookupOutcome::Rejected(_) => None,
        }
    }
}

/// Etapas de uma consulta (usadas nos logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Validating,
    CacheCheck,
    RateCheck,
    Fetching,
    Persisting,
    Done,
    Rejected,
}

impl std::fmt::Display for LookupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LookupState::Idle => "idle",
            LookupState::Validating => "validating",
            LookupState::CacheCheck => "cache_check",
            LookupState::RateCheck => "rate_check",
            LookupState::Fetching => "fetching",
            LookupState::Persisting => "persisting",
            LookupState::Done => "done",
            LookupState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}
