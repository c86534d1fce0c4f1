//! Janela deslizante de consultas à API.

use std::collections::VecDeque;

use chrono::{DateTime, Local, TimeDelta};

/// Consultas remotas permitidas por janela.
pub const CALLS_PER_MINUTE: u32 = 5;

/// Duração da janela, em segundos.
pub const WINDOW_SECS: i64 = 60;

/// Limitador de consultas por janela deslizante de um minuto.
///
/// Guarda o horário de cada tentativa de consulta remota. Entradas com 60
/// segundos ou mais são removidas antes de cada decisão de admissão.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    calls: VecDeque<DateTime<Local>>,
    quota: u32,
    window: TimeDelta,
}

impl RateLimiter {
    /// Cria um limitador com a cota fixa de 5 consultas por minuto.
    pub fn new() -> Self {
        Self {
            calls: VecDeque::new(),
            quota: CALLS_PER_MINUTE,
            window: TimeDelta::seconds(WINDOW_SECS),
        }
    }

    /// Registra uma tentativa de consulta.
    pub fn record_attempt(&mut self, now: DateTime<Local>) {
        self.calls.push_back(now);
        tracing::trace!(calls = self.calls.len(), "Tentativa registrada");
    }

    /// Remove tentativas fora da janela. Retorna quantas foram removidas.
    pub fn prune(&mut self, now: DateTime<Local>) -> usize {
        let before = self.calls.len();
        let window = self.window;
        self.calls.retain(|t| now.signed_duration_since(*t) < window);
        before - self.calls.len()
    }

    /// Consultas restantes na janela atual (nunca negativo).
    pub fn remaining_quota(&mut self, now: DateTime<Local>) -> u32 {
        self.prune(now);
        self.quota.saturating_sub(self.in_window())
    }

    /// Indica se a cota da janela atual foi esgotada.
    pub fn is_exceeded(&mut self, now: DateTime<Local>) -> bool {
        self.prune(now);
        self.in_window() >= self.quota
    }

    /// Momento em que a tentativa mais antiga sai da janela.
    pub fn next_expiry(&self) -> Option<DateTime<Local>> {
        self.calls.iter().min().map(|oldest| *oldest + self.window)
    }

    /// Número de tentativas guardadas (sem podar).
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Indica se não há tentativas guardadas.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Cota por janela.
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Duração da janela.
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    fn in_window(&self) -> u32 {
        u32::try_from(self.calls.len()).unwrap_or(u32::MAX)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: i64) -> TimeDelta {
        TimeDelta::seconds(n)
    }

    #[test]
    fn test_fresh_limiter() {
        let mut limiter = RateLimiter::new();
        let now = Local::now();

        assert_eq!(limiter.remaining_quota(now), 5);
        assert!(!limiter.is_exceeded(now));
        assert!(limiter.next_expiry().is_none());
    }

    #[test]
    fn test_quota_decreases() {
        let mut limiter = RateLimiter::new();
        let now = Local::now();

        limiter.record_attempt(now);
        limiter.record_attempt(now);
        assert_eq!(limiter.remaining_quota(now), 3);
    }

    #[test]
    fn test_exceeded_after_five_attempts() {
        let mut limiter = RateLimiter::new();
        let start = Local::now();

        for i in 0..5 {
            assert!(!limiter.is_exceeded(start + secs(i)));
            limiter.record_attempt(start + secs(i));
        }

        assert!(limiter.is_exceeded(start + secs(10)));
        assert_eq!(limiter.remaining_quota(start + secs(10)), 0);
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut limiter = RateLimiter::new();
        let now = Local::now();

        for _ in 0..8 {
            limiter.record_attempt(now);
        }

        assert_eq!(limiter.len(), 8);
        assert_eq!(limiter.remaining_quota(now), 0);
    }

    #[test]
    fn test_prune_boundary_is_sixty_seconds() {
        let mut limiter = RateLimiter::new();
        let start = Local::now();
        limiter.record_attempt(start);

        assert_eq!(limiter.prune(start + secs(59)), 0);
        assert_eq!(limiter.len(), 1);

        assert_eq!(limiter.prune(start + secs(60)), 1);
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_sliding_window_frees_slots_individually() {
        let mut limiter = RateLimiter::new();
        let start = Local::now();

        for i in 0..5 {
            limiter.record_attempt(start + secs(i * 10));
        }
        assert!(limiter.is_exceeded(start + secs(45)));

        // Primeira tentativa (t=0) sai da janela em t=60
        assert!(!limiter.is_exceeded(start + secs(60)));
        assert_eq!(limiter.remaining_quota(start + secs(60)), 1);

        // Todas saem em t=100
        assert_eq!(limiter.remaining_quota(start + secs(100)), 5);
    }

    #[test]
    fn test_next_expiry() {
        let mut limiter = RateLimiter::new();
        let start = Local::now();

        limiter.record_attempt(start + secs(5));
        limiter.record_attempt(start);

        assert_eq!(limiter.next_expiry(), Some(start + secs(60)));
    }

    #[test]
    fn test_defaults() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.quota(), CALLS_PER_MINUTE);
        assert_eq!(limiter.window(), TimeDelta::seconds(60));
    }
}
