//! Exibição de resultados no terminal.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cnpj::{format_cnpj, Cnpj};
use crate::lookup::{LookupObserver, RecordSource, Rejection};
use crate::ratelimit::CALLS_PER_MINUTE;
use crate::types::Record;

/// Formata um registro para exibição.
pub fn format_record(record: &Record, source: Option<RecordSource>) -> String {
    let origin = match source {
        Some(RecordSource::Cache) => " (registro local)",
        Some(RecordSource::Remote) => " (API)",
        None => "",
    };

    format!(
        "CNPJ:               {}\n\
         Razão social:       {}\n\
         UF:                 {}\n\
         Inscrição estadual: {}\n\
         Consultado em:      {}{}",
        format_cnpj(&record.id),
        record.business_name,
        record.region_code,
        record.registration_number,
        record.queried_at_text(),
        origin
    )
}

/// Linha com as consultas restantes.
pub fn quota_line(remaining: u32) -> String {
    format!("Consultas restantes por minuto: {}", remaining)
}

/// Observador que escreve no terminal.
///
/// Mostra um spinner enquanto a API responde e avisa quando o limite de
/// consultas é liberado pelo timer.
pub struct ConsoleObserver {
    spinner: Mutex<Option<ProgressBar>>,
    remaining: AtomicU32,
    limited: AtomicBool,
}

impl ConsoleObserver {
    /// Cria o observador.
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            remaining: AtomicU32::new(CALLS_PER_MINUTE),
            limited: AtomicBool::new(false),
        }
    }

    /// Última cota notificada.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Relaxed)
    }

    fn stop_spinner(&self) {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupObserver for ConsoleObserver {
    fn name(&self) -> &str {
        "console"
    }

    fn on_fetch_started(&self, cnpj: &Cnpj) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Consultando {}...", cnpj.formatted()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(spinner);
    }

    fn on_result(&self, record: &Record, source: RecordSource) {
        self.stop_spinner();
        println!("{}", format_record(record, Some(source)));
    }

    fn on_rejected(&self, rejection: &Rejection) {
        self.stop_spinner();
        if matches!(rejection, Rejection::RateLimited { .. }) {
            self.limited.store(true, Ordering::Relaxed);
        }
        println!("{}", rejection);
    }

    fn on_quota_changed(&self, remaining: u32) {
        self.remaining.store(remaining, Ordering::Relaxed);
    }

    fn on_window_reset(&self) {
        if self.limited.swap(false, Ordering::Relaxed) {
            println!("\nLimite liberado. {}", quota_line(self.remaining()));
        }
    }
}
