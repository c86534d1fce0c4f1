//! Normalização e validação de CNPJ.

use serde::{Deserialize, Serialize};

use crate::{ConsultaError, ConsultaResult};

/// Número de dígitos de um CNPJ.
pub const CNPJ_LEN: usize = 14;

/// Pontuação aceita na entrada e removida na normalização.
const PUNCTUATION: [char; 3] = ['.', '/', '-'];

/// CNPJ canônico: exatamente 14 dígitos, sem pontuação.
///
/// Só é construído por [`normalize_and_validate`], inclusive na desserialização.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnpj(String);

impl Cnpj {
    /// Os 14 dígitos.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Máscara de exibição `XX.XXX.XXX/XXXX-XX`.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        )
    }

    /// Consome o CNPJ e retorna os dígitos.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Cnpj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cnpj {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cnpj {
    type Error = ConsultaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize_and_validate(&value)
    }
}

impl From<Cnpj> for String {
    fn from(cnpj: Cnpj) -> Self {
        cnpj.0
    }
}

impl std::str::FromStr for Cnpj {
    type Err = ConsultaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_and_validate(s)
    }
}

/// Remove a pontuação e valida o CNPJ.
///
/// Espaços nas bordas são ignorados. Falha com [`ConsultaError::InvalidCnpj`]
/// se o que sobrar não tiver exatamente 14 dígitos decimais. Os dígitos
/// verificadores não são conferidos: quem decide se o CNPJ existe é a API.
pub fn normalize_and_validate(raw: &str) -> ConsultaResult<Cnpj> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();

    if digits.len() != CNPJ_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConsultaError::InvalidCnpj(raw.to_string()));
    }

    Ok(Cnpj(digits))
}

/// Formata um identificador para exibição, se for um CNPJ válido.
///
/// Valores que não são CNPJ voltam sem alteração.
pub fn format_cnpj(id: &str) -> String {
    normalize_and_validate(id)
        .map(|cnpj| cnpj.formatted())
        .unwrap_or_else(|_| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_input() {
        let cnpj = normalize_and_validate("11.222.333/0001-81").unwrap();
        assert_eq!(cnpj.as_str(), "11222333000181");
    }

    #[test]
    fn test_plain_digits() {
        let cnpj = normalize_and_validate("11222333000181").unwrap();
        assert_eq!(cnpj.to_string(), "11222333000181");
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert!(normalize_and_validate("  11.222.333/0001-81 \n").is_ok());
    }

    #[test]
    fn test_too_short() {
        let err = normalize_and_validate("123").unwrap_err();
        assert!(matches!(err, ConsultaError::InvalidCnpj(ref raw) if raw == "123"));
    }

    #[test]
    fn test_too_long() {
        assert!(normalize_and_validate("112223330001810").is_err());
    }

    #[test]
    fn test_rejects_letters_and_other_punctuation() {
        assert!(normalize_and_validate("11222333000l81").is_err());
        assert!(normalize_and_validate("11 222 333 0001 81").is_err());
        assert!(normalize_and_validate("11,222,333/0001-81").is_err());
        assert!(normalize_and_validate("+1222333000181").is_err());
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        // Dígitos árabe-índicos não contam
        assert!(normalize_and_validate("١١222333000181").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_and_validate("").is_err());
        assert!(normalize_and_validate("../-").is_err());
    }

    #[test]
    fn test_punctuation_anywhere() {
        let cnpj = normalize_and_validate("-1.1-2/2.2333000181//").unwrap();
        assert_eq!(cnpj.as_str(), "11222333000181");
    }

    #[test]
    fn test_formatted_mask() {
        let cnpj = normalize_and_validate("11222333000181").unwrap();
        assert_eq!(cnpj.formatted(), "11.222.333/0001-81");
    }

    #[test]
    fn test_format_cnpj_passthrough() {
        assert_eq!(format_cnpj("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_cnpj("abc"), "abc");
    }

    #[test]
    fn test_from_str() {
        let cnpj: Cnpj = "11.222.333/0001-81".parse().unwrap();
        assert_eq!(cnpj.into_inner(), "11222333000181");
    }

    #[test]
    fn test_serde_validates() {
        let cnpj: Cnpj = serde_json::from_str("\"11.222.333/0001-81\"").unwrap();
        assert_eq!(cnpj.as_str(), "11222333000181");
        assert_eq!(serde_json::to_string(&cnpj).unwrap(), "\"11222333000181\"");

        assert!(serde_json::from_str::<Cnpj>("\"123\"").is_err());
    }
}
