//! Verificação de conectividade antes de gastar cota.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::net::TcpStream;

use crate::{ConsultaError, ConsultaResult};

/// Verifica se há caminho de rede até a API.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// `true` se a rede parece disponível.
    async fn is_network_available(&self) -> bool;
}

/// Tenta abrir uma conexão TCP com o host da API.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    /// Cria uma sonda para o host e porta de `base_url`.
    pub fn for_url(base_url: &str, timeout: Duration) -> ConsultaResult<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| ConsultaError::config(format!("base_url inválida '{}': {}", base_url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| ConsultaError::config(format!("base_url sem host: '{}'", base_url)))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(443);

        Ok(Self {
            host,
            port,
            timeout,
        })
    }

    /// Endereço testado (`host:porta`).
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_network_available(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(target = %self.target(), error = %e, "Sem conectividade");
                false
            }
            Err(_) => {
                tracing::debug!(target = %self.target(), "Timeout ao testar conectividade");
                false
            }
        }
    }
}

/// Sonda que sempre responde "online" (verificação desabilitada).
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_network_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_for_url_default_ports() {
        let probe = TcpProbe::for_url("https://open.cnpja.com/office", Duration::from_secs(1)).unwrap();
        assert_eq!(probe.target(), "open.cnpja.com:443");

        let probe = TcpProbe::for_url("http://localhost:8080/x", Duration::from_secs(1)).unwrap();
        assert_eq!(probe.target(), "localhost:8080");
    }

    #[test]
    fn test_for_url_invalid() {
        assert!(TcpProbe::for_url("não é url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_probe_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = TcpProbe::for_url(&format!("http://{}/", addr), Duration::from_secs(2)).unwrap();
        assert!(probe.is_network_available().await);
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = TcpProbe::for_url(&format!("http://{}/", addr), Duration::from_secs(2)).unwrap();
        assert!(!probe.is_network_available().await);
    }

    #[tokio::test]
    async fn test_always_online() {
        assert!(AlwaysOnline.is_network_available().await);
    }
}
