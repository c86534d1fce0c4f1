//! Arquivo CSV de registros consultados.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::types::Record;
use crate::{ConsultaError, ConsultaResult};

/// Colunas do arquivo, na ordem em que são gravadas.
pub const CSV_HEADER: [&str; 5] = [
    "Cnpj",
    "BusinessName",
    "State",
    "StateRegistration",
    "QueryTime",
];

/// Armazenamento durável de registros, um por CNPJ.
///
/// O arquivo inteiro é relido e regravado a cada inserção. Isso só é
/// aceitável porque as gravações são limitadas pelo limite de consultas.
pub struct RecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Cria um store apontando para `path`. Nada é lido ou criado ainda.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Caminho do arquivo CSV.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lê todos os registros.
    ///
    /// Retorna lista vazia se o arquivo não existir. Conteúdo malformado é
    /// erro ([`ConsultaError::Persistence`]), nunca descartado em silêncio.
    pub fn load_all(&self) -> ConsultaResult<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<Record>().enumerate() {
            // +2: cabeçalho e índice a partir de 1
            let record = row.map_err(|e| {
                ConsultaError::persistence(format!(
                    "{} (linha {}): {}",
                    self.path.display(),
                    idx + 2,
                    e
                ))
            })?;
            records.push(record);
        }

        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "Registros carregados"
        );

        Ok(records)
    }

    /// Busca um registro pelo CNPJ canônico (comparação exata).
    pub fn find(&self, id: &str) -> ConsultaResult<Option<Record>> {
        Ok(self.load_all()?.into_iter().find(|r| r.id == id))
    }

    /// Insere um registro se o CNPJ ainda não existir.
    ///
    /// Retorna `false` (sem tocar no arquivo) quando já há registro para o
    /// mesmo CNPJ: a primeira consulta prevalece.
    pub fn insert(&self, record: Record) -> ConsultaResult<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load_all()?;
        if records.iter().any(|r| r.id == record.id) {
            tracing::debug!(cnpj = %record.id, "Registro já existe, inserção ignorada");
            return Ok(false);
        }

        records.push(record);
        self.write_all(&records)?;

        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "Registro gravado"
        );

        Ok(true)
    }

    /// Número de registros gravados.
    pub fn count(&self) -> ConsultaResult<usize> {
        Ok(self.load_all()?.len())
    }

    /// Regrava o arquivo completo via arquivo temporário + rename.
    fn write_all(&self, records: &[Record]) -> ConsultaResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                tracing::info!("Diretório criado: {}", parent.display());
            }
        }

        let tmp_path = self.tmp_path();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp_path)?;
            writer.write_record(CSV_HEADER)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
