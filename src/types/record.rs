//! Registro de empresa consultado.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Valor usado quando a API não retorna um campo.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formato do horário da consulta gravado no arquivo.
///
/// Cultura invariante (mês primeiro), o mesmo dos arquivos já existentes.
/// Ler e regravar uma linha preserva o texto original.
pub const QUERY_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Formato do horário exibido ao usuário.
pub const DISPLAY_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Registro de um CNPJ consultado.
///
/// Os nomes serializados são as colunas do arquivo CSV e não podem mudar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// CNPJ canônico (14 dígitos, sem pontuação).
    #[serde(rename = "Cnpj")]
    pub id: String,

    /// Razão social.
    #[serde(rename = "BusinessName")]
    pub business_name: String,

    /// UF do endereço.
    #[serde(rename = "State")]
    pub region_code: String,

    /// Inscrição estadual.
    #[serde(rename = "StateRegistration")]
    pub registration_number: String,

    /// Horário local da consulta, com precisão de segundos.
    #[serde(rename = "QueryTime", with = "query_time")]
    pub queried_at: NaiveDateTime,
}

impl Record {
    /// Cria um registro, truncando o horário para segundos.
    pub fn new(
        id: impl Into<String>,
        business_name: impl Into<String>,
        region_code: impl Into<String>,
        registration_number: impl Into<String>,
        queried_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            business_name: business_name.into(),
            region_code: region_code.into(),
            registration_number: registration_number.into(),
            queried_at: queried_at.with_nanosecond(0).unwrap_or(queried_at),
        }
    }

    /// Horário da consulta no formato de exibição (dia primeiro).
    pub fn queried_at_text(&self) -> String {
        self.queried_at.format(DISPLAY_TIME_FORMAT).to_string()
    }
}

/// Formata um horário no formato do arquivo.
pub fn format_query_time(time: &NaiveDateTime) -> String {
    time.format(QUERY_TIME_FORMAT).to_string()
}

/// Lê um horário no formato do arquivo.
///
/// Só um formato é aceito: `03/05/2024` é sempre 5 de março, nunca 3 de maio.
pub fn parse_query_time(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), QUERY_TIME_FORMAT).ok()
}

mod query_time {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_query_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_query_time(&text)
            .ok_or_else(|| de::Error::custom(format!("horário de consulta inválido: '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(14, 7, 9, 450)
            .unwrap()
    }

    #[test]
    fn test_new_truncates_to_seconds() {
        let record = Record::new("11222333000181", "ACME", "SP", "123", sample_time());
        assert_eq!(record.queried_at.nanosecond(), 0);
        assert_eq!(record.queried_at_text(), "05/03/2024 14:07:09");
        assert_eq!(format_query_time(&record.queried_at), "03/05/2024 14:07:09");
    }

    #[test]
    fn test_parse_is_month_first() {
        let parsed = parse_query_time("03/05/2024 10:00:00").unwrap();
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 5);

        let parsed = parse_query_time("12/25/2023 08:00:00").unwrap();
        assert_eq!(parsed.month(), 12);
        assert_eq!(parsed.day(), 25);
    }

    #[test]
    fn test_parse_then_format_keeps_text() {
        for text in ["03/05/2024 10:00:00", "12/25/2023 08:00:00", "01/01/2020 00:00:00"] {
            let parsed = parse_query_time(text).unwrap();
            assert_eq!(format_query_time(&parsed), text);
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_query_time("ontem").is_none());
        assert!(parse_query_time("").is_none());
        // Dia primeiro com dia > 12 não é mês válido
        assert!(parse_query_time("25/12/2023 08:00:00").is_none());
        assert!(parse_query_time("2023-12-25T08:00:00").is_none());
    }
}
