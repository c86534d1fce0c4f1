//! Observadores de consultas.
//!
//! A camada de exibição não é acoplada ao orquestrador: ela se registra como
//! [`LookupObserver`] e recebe os eventos abaixo.
//!
//! - `on_fetch_started`: consulta remota iniciada
//! - `on_result`: registro encontrado (cache ou API)
//! - `on_rejected`: consulta rejeitada
//! - `on_quota_changed`: a janela de consultas mudou
//! - `on_window_reset`: o timer de reset disparou

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::cnpj::Cnpj;
use crate::types::Record;

use super::outcome::{RecordSource, Rejection};

// ═══════════════════════════════════════════════════════════════════════════
// Trait LookupObserver
// ═══════════════════════════════════════════════════════════════════════════

/// Recebe eventos do orquestrador.
///
/// Os métodos são síncronos e devem retornar rápido: `on_quota_changed` e
/// `on_window_reset` também são chamados pela task do timer.
pub trait LookupObserver: Send + Sync {
    /// Nome do observador.
    fn name(&self) -> &str;

    /// Consulta remota iniciada.
    fn on_fetch_started(&self, _cnpj: &Cnpj) {}

    /// Registro encontrado.
    fn on_result(&self, record: &Record, source: RecordSource);

    /// Consulta rejeitada.
    fn on_rejected(&self, rejection: &Rejection);

    /// Consultas restantes na janela.
    fn on_quota_changed(&self, remaining: u32);

    /// Janela expirada pelo timer; mensagens de limite podem ser limpas.
    fn on_window_reset(&self) {}
}

// ═══════════════════════════════════════════════════════════════════════════
// Conjunto de observadores
// ═══════════════════════════════════════════════════════════════════════════

/// Lista de observadores notificados em ordem de registro.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn LookupObserver>>,
}

impl ObserverSet {
    /// Cria um conjunto vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um observador.
    pub fn register(&mut self, observer: Arc<dyn LookupObserver>) {
        tracing::debug!(observer = observer.name(), "Registering observer");
        self.observers.push(observer);
    }

    /// Número de observadores.
    pub fn count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn fetch_started(&self, cnpj: &Cnpj) {
        self.observers.iter().for_each(|o| o.on_fetch_started(cnpj));
    }

    pub(crate) fn result(&self, record: &Record, source: RecordSource) {
        self.observers.iter().for_each(|o| o.on_result(record, source));
    }

    pub(crate) fn rejected(&self, rejection: &Rejection) {
        self.observers.iter().for_each(|o| o.on_rejected(rejection));
    }

    pub(crate) fn quota_changed(&self, remaining: u32) {
        self.observers
            .iter()
            .for_each(|o| o.on_quota_changed(remaining));
    }

    pub(crate) fn window_reset(&self) {
        self.observers.iter().for_each(|o| o.on_window_reset());
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LoggingObserver
// ═══════════════════════════════════════════════════════════════════════════

/// Registra os eventos no log (tracing).
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LookupObserver for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_fetch_started(&self, cnpj: &Cnpj) {
        tracing::debug!(cnpj = %cnpj, "Consultando API");
    }

    fn on_result(&self, record: &Record, source: RecordSource) {
        tracing::info!(
            cnpj = %record.id,
            source = %source,
            state = %record.region_code,
            "Lookup completed"
        );
    }

    fn on_rejected(&self, rejection: &Rejection) {
        match rejection {
            Rejection::RemoteError { detail } => {
                tracing::warn!(kind = rejection.kind(), detail = %detail, "Lookup rejected");
            }
            _ => tracing::info!(kind = rejection.kind(), "Lookup rejected"),
        }
    }

    fn on_quota_changed(&self, remaining: u32) {
        tracing::debug!(remaining, "Quota changed");
    }

    fn on_window_reset(&self) {
        tracing::debug!("Rate limit window reset");
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// StatsObserver
// ═══════════════════════════════════════════════════════════════════════════

/// Contadores da sessão.
#[derive(Debug, Default)]
pub struct StatsObserver {
    cache_hits: AtomicU64,
    remote_hits: AtomicU64,
    rejections: AtomicU64,
    fetches_started: AtomicU64,
    last_quota: AtomicU32,
}

impl StatsObserver {
    /// Cria contadores zerados.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registros servidos do arquivo local.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Registros obtidos da API.
    pub fn remote_hits(&self) -> u64 {
        self.remote_hits.load(Ordering::Relaxed)
    }

    /// Consultas rejeitadas.
    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }

    /// Consultas remotas iniciadas.
    pub fn fetches_started(&self) -> u64 {
        self.fetches_started.load(Ordering::Relaxed)
    }

    /// Última cota restante notificada.
    pub fn last_quota(&self) -> u32 {
        self.last_quota.load(Ordering::Relaxed)
    }
}

impl LookupObserver for StatsObserver {
    fn name(&self) -> &str {
        "stats"
    }

    fn on_fetch_started(&self, _cnpj: &Cnpj) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
    }

    fn on_result(&self, _record: &Record, source: RecordSource) {
        match source {
            RecordSource::Cache => self.cache_hits.fetch_add(1, Ordering::Relaxed),
            RecordSource::Remote => self.remote_hits.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn on_rejected(&self, _rejection: &Rejection) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    fn on_quota_changed(&self, remaining: u32) {
        self.last_quota.store(remaining, Ordering::Relaxed);
    }
}
