//! Orquestração de consultas de CNPJ.
//!
//! Compõe validação → cache local → limite de consultas → API → gravação,
//! e avisa a camada de exibição por meio de observadores.

mod engine;
mod observer;
mod outcome;

pub use engine::LookupEngine;
pub use observer::{LoggingObserver, LookupObserver, ObserverSet, StatsObserver};
pub use outcome::{LookupOutcome, LookupState, RecordSource, Rejection};
