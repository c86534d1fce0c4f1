//! Tipos compartilhados do consulta-cnpj.

pub mod config;
pub mod errors;
pub mod record;

pub use record::Record;
