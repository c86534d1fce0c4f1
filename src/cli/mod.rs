//! Interface de linha de comando do consulta-cnpj.

pub mod commands;
pub mod display;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::DEFAULT_CONFIG_FILE;

/// consulta-cnpj - Consulta de CNPJ com cache local.
#[derive(Parser, Debug)]
#[command(name = "consulta-cnpj")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Consulta um CNPJ (com ou sem máscara).
    Lookup {
        /// CNPJ a consultar, ex.: 11.222.333/0001-81.
        cnpj: String,

        /// Imprime o resultado em JSON.
        #[arg(long)]
        json: bool,
    },

    /// Sessão interativa: várias consultas respeitando o limite por minuto.
    Shell,

    /// Lista os registros gravados.
    List {
        /// Número máximo de registros.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Diagnostica configuração, arquivo de registros e conectividade.
    Doctor,

    /// Configura opções interativamente.
    Config,

    /// Mostra versão.
    Version,
}
