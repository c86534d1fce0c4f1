//! Tipos de erro do consulta-cnpj.

use thiserror::Error;

/// Tipo de resultado padrão do consulta-cnpj.
pub type ConsultaResult<T> = Result<T, ConsultaError>;

/// Erros possíveis no consulta-cnpj.
///
/// Rejeições de uma consulta (CNPJ inválido, limite atingido, etc.) não são
/// erros: elas aparecem em [`crate::lookup::Rejection`]. Aqui ficam apenas as
/// falhas que devem ser propagadas, como um arquivo de registros corrompido.
#[derive(Error, Debug)]
pub enum ConsultaError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro de CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arquivo de registros inválido: {0}")]
    Persistence(String),

    #[error("CNPJ inválido: '{0}'")]
    InvalidCnpj(String),

    #[error("Erro ao criar cliente HTTP: {0}")]
    Http(String),

    #[error("{0}")]
    Other(String),
}

impl ConsultaError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de persistência.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConsultaError::InvalidCnpj("123".to_string());
        assert_eq!(err.to_string(), "CNPJ inválido: '123'");

        let err = ConsultaError::persistence("linha 3: data inválida");
        assert!(err.to_string().contains("linha 3"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "sumiu");
        let err: ConsultaError = io.into();
        assert!(matches!(err, ConsultaError::Io(_)));
    }
}
