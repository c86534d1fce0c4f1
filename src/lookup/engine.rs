//! Orquestrador de consultas.
//!
//! Fluxo de uma consulta:
//!
//! ```text
//! Validating → CacheCheck → (conectividade) → RateCheck → Fetching → Persisting → Done
//! ```
//!
//! Qualquer etapa pode terminar em `Rejected`. Registros já gravados são
//! devolvidos direto do cache, sem gastar cota nem acessar a rede.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::Instrument;

use crate::cnpj::{normalize_and_validate, Cnpj};
use crate::ratelimit::{Clock, RateLimiter, ResetTimer, SystemClock};
use crate::registry::{
    AlwaysOnline, ConnectivityProbe, FetchError, HttpRegistryClient, RegistryClient, TcpProbe,
};
use crate::store::RecordStore;
use crate::types::config::Config;
use crate::types::Record;
use crate::ConsultaResult;

use super::observer::{LoggingObserver, LookupObserver, ObserverSet};
use super::outcome::{LookupOutcome, LookupState, RecordSource, Rejection};

/// Orquestrador: cache local + limite de consultas + API remota.
pub struct LookupEngine {
    store: RecordStore,
    registry: Arc<dyn RegistryClient>,
    probe: Arc<dyn ConnectivityProbe>,
    clock: Arc<dyn Clock>,
    limiter: Arc<Mutex<RateLimiter>>,
    reset_timer: Arc<Mutex<ResetTimer>>,
    observers: ObserverSet,
}

impl LookupEngine {
    /// Cria o orquestrador com o relógio do sistema e sem observadores.
    pub fn new(
        store: RecordStore,
        registry: Arc<dyn RegistryClient>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            store,
            registry,
            probe,
            clock: Arc::new(SystemClock),
            limiter: Arc::new(Mutex::new(RateLimiter::new())),
            reset_timer: Arc::new(Mutex::new(ResetTimer::new())),
            observers: ObserverSet::new(),
        }
    }

    /// Monta o orquestrador a partir da configuração (cliente HTTP, sonda
    /// TCP e log de eventos).
    pub fn from_config(config: &Config) -> ConsultaResult<Self> {
        let store = RecordStore::new(config.store.resolved_path());
        let registry = Arc::new(HttpRegistryClient::new(&config.registry)?);

        let probe: Arc<dyn ConnectivityProbe> = if config.network.probe_enabled {
            Arc::new(TcpProbe::for_url(
                &config.registry.base_url,
                Duration::from_secs(config.network.probe_timeout_secs),
            )?)
        } else {
            Arc::new(AlwaysOnline)
        };

        Ok(Self::new(store, registry, probe).with_observer(Arc::new(LoggingObserver)))
    }

    /// Define o relógio.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Registra um observador.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn LookupObserver>) -> Self {
        self.observers.register(observer);
        self
    }

    /// Arquivo de registros.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Consultas remotas ainda permitidas na janela atual.
    pub fn remaining_quota(&self) -> u32 {
        let now = self.clock.now();
        self.limiter().remaining_quota(now)
    }

    /// Indica se o timer de reset está armado.
    pub fn is_reset_armed(&self) -> bool {
        self.reset_timer().is_armed()
    }

    /// Executa uma consulta completa.
    ///
    /// Rejeições voltam como [`LookupOutcome::Rejected`]. `Err` só ocorre em
    /// falhas do arquivo de registros, que não são engolidas.
    pub async fn lookup(&self, raw: &str) -> ConsultaResult<LookupOutcome> {
        let span = tracing::info_span!("lookup", request_id = %uuid::Uuid::new_v4());
        self.run(raw).instrument(span).await
    }

    async fn run(&self, raw: &str) -> ConsultaResult<LookupOutcome> {
        let mut state = LookupState::Idle;

        advance(&mut state, LookupState::Validating);
        let cnpj = match normalize_and_validate(raw) {
            Ok(cnpj) => cnpj,
            Err(_) => {
                return Ok(self.reject(
                    state,
                    Rejection::InvalidId {
                        input: raw.trim().to_string(),
                    },
                ))
            }
        };

        advance(&mut state, LookupState::CacheCheck);
        if let Some(record) = self.store.find(cnpj.as_str())? {
            advance(&mut state, LookupState::Done);
            return Ok(self.found(record, RecordSource::Cache));
        }

        if !self.probe.is_network_available().await {
            return Ok(self.reject(state, Rejection::NoConnectivity));
        }

        advance(&mut state, LookupState::RateCheck);
        if let Err(rejection) = self.admit() {
            return Ok(self.reject(state, rejection));
        }

        advance(&mut state, LookupState::Fetching);
        self.observers.fetch_started(&cnpj);
        let data = match self.registry.fetch(&cnpj).await {
            Ok(data) => data,
            Err(FetchError::UnknownId) => {
                return Ok(self.reject(
                    state,
                    Rejection::UnknownId {
                        cnpj: cnpj.into_inner(),
                    },
                ))
            }
            Err(e) => {
                return Ok(self.reject(
                    state,
                    Rejection::RemoteError {
                        detail: e.to_string(),
                    },
                ))
            }
        };

        advance(&mut state, LookupState::Persisting);
        let record = data.into_record(&cnpj, self.clock.now().naive_local());
        let record = self.persist(&cnpj, record)?;

        advance(&mut state, LookupState::Done);
        Ok(self.found(record, RecordSource::Remote))
    }

    /// Poda a janela e, havendo cota, registra a tentativa e arma o timer.
    fn admit(&self) -> Result<(), Rejection> {
        let now = self.clock.now();

        let (pruned, decision) = {
            let mut limiter = self.limiter();
            let pruned = limiter.prune(now);
            if limiter.is_exceeded(now) {
                let retry_in_secs = limiter
                    .next_expiry()
                    .map(|at| (at - now).num_seconds().max(0) as u64)
                    .unwrap_or(0);
                (pruned, Err(Rejection::RateLimited { retry_in_secs }))
            } else {
                limiter.record_attempt(now);
                (pruned, Ok(limiter.remaining_quota(now)))
            }
        };

        match decision {
            Ok(remaining) => {
                tracing::debug!(remaining, "Consulta admitida");
                self.observers.quota_changed(remaining);
                self.schedule_reset();
                Ok(())
            }
            Err(rejection) => {
                if pruned > 0 {
                    self.observers.quota_changed(0);
                }
                Err(rejection)
            }
        }
    }

    /// Arma o timer de reset, se ainda não estiver armado.
    fn schedule_reset(&self) {
        WindowReset {
            limiter: Arc::clone(&self.limiter),
            timer: Arc::downgrade(&self.reset_timer),
            clock: Arc::clone(&self.clock),
            observers: self.observers.clone(),
        }
        .arm();
    }

    /// Grava o registro. Se outro já tiver sido gravado para o mesmo CNPJ,
    /// devolve o gravado: a primeira consulta prevalece.
    fn persist(&self, cnpj: &Cnpj, record: Record) -> ConsultaResult<Record> {
        if self.store.insert(record.clone())? {
            return Ok(record);
        }
        Ok(self.store.find(cnpj.as_str())?.unwrap_or(record))
    }

    fn found(&self, record: Record, source: RecordSource) -> LookupOutcome {
        self.observers.result(&record, source);
        LookupOutcome::Found { record, source }
    }

    fn reject(&self, at: LookupState, rejection: Rejection) -> LookupOutcome {
        tracing::debug!(state = %at, kind = rejection.kind(), "{} -> {}", at, LookupState::Rejected);
        self.observers.rejected(&rejection);
        LookupOutcome::Rejected(rejection)
    }

    fn limiter(&self) -> MutexGuard<'_, RateLimiter> {
        lock(&self.limiter)
    }

    fn reset_timer(&self) -> MutexGuard<'_, ResetTimer> {
        lock(&self.reset_timer)
    }
}

/// Estado compartilhado entre o orquestrador e o timer de reset.
///
/// O timer dispara quando a tentativa mais antiga sai da janela. Ao disparar,
/// poda a janela, avisa os observadores e, se ainda houver tentativas na
/// janela, se rearma para a próxima expiração. Assim a cota exibida volta a 5
/// sem depender de uma nova consulta.
///
/// O timer é referenciado por `Weak`: descartar o orquestrador cancela um
/// disparo pendente.
struct WindowReset {
    limiter: Arc<Mutex<RateLimiter>>,
    timer: Weak<Mutex<ResetTimer>>,
    clock: Arc<dyn Clock>,
    observers: ObserverSet,
}

impl WindowReset {
    fn arm(self) {
        let Some(timer) = self.timer.upgrade() else {
            return;
        };

        let now = self.clock.now();
        let delay = {
            let limiter = lock(&self.limiter);
            limiter
                .next_expiry()
                .unwrap_or(now + limiter.window())
                .signed_duration_since(now)
                .to_std()
                .unwrap_or(Duration::ZERO)
        };

        lock(&timer).schedule(delay, move || self.fire());
    }

    fn fire(self) {
        let Some(timer) = self.timer.upgrade() else {
            return;
        };
        // O disparo atual terminou: libera o timer para o rearme abaixo
        lock(&timer).release();
        drop(timer);

        let (remaining, pending) = {
            let mut limiter = lock(&self.limiter);
            let remaining = limiter.remaining_quota(self.clock.now());
            (remaining, !limiter.is_empty())
        };

        tracing::debug!(remaining, pending, "Janela de consultas expirada");
        self.observers.quota_changed(remaining);
        self.observers.window_reset();

        if pending {
            self.arm();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn advance(state: &mut LookupState, next: LookupState) {
    tracing::trace!("{} -> {}", state, next);
    *state = next;
}
