//! Timer de reset da janela de consultas.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Timer de disparo único.
///
/// Enquanto armado, novos agendamentos são ignorados. O disparo roda numa
/// task própria, independente de qualquer consulta em andamento. Descartar o
/// timer cancela um disparo pendente.
#[derive(Debug, Default)]
pub struct ResetTimer {
    handle: Option<JoinHandle<()>>,
}

impl ResetTimer {
    /// Cria um timer desarmado.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Indica se há um disparo pendente.
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Arma o timer para executar `on_fire` depois de `delay`.
    ///
    /// Retorna `false` se o timer já estava armado (nada é agendado).
    /// Precisa ser chamado dentro de um runtime tokio.
    pub fn schedule<F>(&mut self, delay: Duration, on_fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_armed() {
            return false;
        }

        tracing::debug!(delay_ms = delay.as_millis() as u64, "Timer de reset armado");

        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        }));
        true
    }

    /// Esquece o disparo atual sem abortá-lo.
    ///
    /// Chamado pelo próprio callback, que ainda roda dentro da task do
    /// disparo, para poder rearmar o timer.
    pub fn release(&mut self) {
        self.handle = None;
    }

    /// Cancela um disparo pendente.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
