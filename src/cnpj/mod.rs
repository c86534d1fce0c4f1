//! Identificadores CNPJ.
//!
//! Normaliza a entrada do usuário (com ou sem máscara) para os 14 dígitos
//! canônicos usados como chave no arquivo de registros e na API.

mod validator;

pub use validator::{format_cnpj, normalize_and_validate, Cnpj, CNPJ_LEN};
