//! # consulta-cnpj
//!
//! Consulta de CNPJ com cache local e limite de consultas por minuto.
//!
//! Registros já consultados são servidos de um arquivo CSV local; consultas
//! novas passam pelo limitador (5 por minuto) antes de chegar à API pública.
//!
//! ## Módulos
//!
//! - [`cli`] - Interface de linha de comando
//! - [`cnpj`] - Normalização e validação de CNPJ
//! - [`lookup`] - Orquestrador de consultas e observadores
//! - [`ratelimit`] - Janela deslizante, timer de reset e relógio
//! - [`registry`] - Cliente da API e verificação de conectividade
//! - [`store`] - Arquivo CSV de registros
//! - [`types`] - Tipos compartilhados

#[cfg(feature = "cli")]
pub mod cli;
pub mod cnpj;
pub mod lookup;
pub mod ratelimit;
pub mod registry;
pub mod store;
pub mod types;

pub use types::config::Config;
pub use types::errors::{ConsultaError, ConsultaResult};
pub use types::Record;
