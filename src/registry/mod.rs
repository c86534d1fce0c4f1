//! Acesso à API remota de CNPJ.
//!
//! - [`RegistryClient`]: interface `fetch(cnpj)` usada pelo orquestrador
//! - [`HttpRegistryClient`]: implementação HTTP com reqwest
//! - [`ConnectivityProbe`]: verificação de rede antes de gastar cota

mod client;
mod connectivity;

pub use client::{CompanyData, FetchError, HttpRegistryClient, RegistryClient};
pub use connectivity::{AlwaysOnline, ConnectivityProbe, TcpProbe};
