//! Armazenamento local dos registros consultados.
//!
//! Este módulo persiste os registros em um arquivo CSV, um por CNPJ,
//! evitando consultar a API de novo para CNPJs já conhecidos.

mod csv_store;

pub use csv_store::{RecordStore, CSV_HEADER};
