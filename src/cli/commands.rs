//! Implementação dos comandos CLI do consulta-cnpj.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, Input};
use serde::Serialize;

use super::display::{quota_line, ConsoleObserver};
use crate::cnpj::format_cnpj;
use crate::lookup::{LookupEngine, LookupOutcome, RecordSource, StatsObserver};
use crate::registry::{ConnectivityProbe, TcpProbe};
use crate::store::RecordStore;
use crate::types::config::{Config, DEFAULT_CONFIG_FILE};
use crate::types::Record;
use crate::{ConsultaError, ConsultaResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> ConsultaResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    // Create directory if it doesn't exist
    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'consulta-cnpj config' to modify.");
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    // The record file and its directory are created on the first lookup
    let store_path = config.store.resolved_path();

    println!("consulta-cnpj initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Records file: {}", store_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Check connectivity: consulta-cnpj doctor");
    println!("  2. Look up a company: consulta-cnpj lookup 11.222.333/0001-81");
    println!("  3. Interactive session: consulta-cnpj shell");

    Ok(())
}

/// Saída JSON do comando `lookup`.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LookupJson<'a> {
    Found {
        source: RecordSource,
        record: &'a Record,
    },
    Rejected {
        kind: &'static str,
        message: String,
    },
}

/// Consulta um CNPJ.
///
/// Retorna `false` se a consulta foi rejeitada. A rejeição já foi exibida
/// (pelo observador de console ou no JSON), então cabe ao chamador só
/// encerrar com status diferente de zero.
pub async fn lookup(raw: &str, json: bool, config: &Config) -> ConsultaResult<bool> {
    let mut engine = LookupEngine::from_config(config)?;
    if !json {
        engine = engine.with_observer(Arc::new(ConsoleObserver::new()));
    }

    let outcome = engine.lookup(raw).await?;

    if json {
        let output = match &outcome {
            LookupOutcome::Found { record, source } => LookupJson::Found {
                source: *source,
                record,
            },
            LookupOutcome::Rejected(rejection) => LookupJson::Rejected {
                kind: rejection.kind(),
                message: rejection.message(),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if matches!(outcome.source(), Some(RecordSource::Remote)) {
        println!("{}", quota_line(engine.remaining_quota()));
    }

    Ok(outcome.record().is_some())
}

/// Sessão interativa de consultas.
pub async fn shell(config: &Config) -> ConsultaResult<()> {
    let console = Arc::new(ConsoleObserver::new());
    let stats = Arc::new(StatsObserver::new());
    let engine = LookupEngine::from_config(config)?
        .with_observer(console)
        .with_observer(stats.clone());

    let theme = ColorfulTheme::default();

    println!("Consulta de CNPJ");
    println!("Digite um CNPJ, 'limpar' para limpar a tela ou 'sair' para encerrar.");
    println!("Registros em: {}\n", engine.store().path().display());

    loop {
        let input: String = Input::with_theme(&theme)
            .with_prompt(format!("CNPJ [{} restantes]", engine.remaining_quota()))
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;

        match input.trim().to_lowercase().as_str() {
            "" => continue,
            "sair" | "exit" | "q" => break,
            "limpar" => {
                print!("\x1B[2J\x1B[1;1H");
                continue;
            }
            _ => {}
        }

        engine.lookup(&input).await?;
        println!();
    }

    println!(
        "Sessão encerrada: {} da API, {} do cache, {} rejeitadas.",
        stats.remote_hits(),
        stats.cache_hits(),
        stats.rejections()
    );

    Ok(())
}

/// Lista os registros gravados, mais recentes primeiro.
pub fn list(limit: usize, config: &Config) -> ConsultaResult<()> {
    let store = RecordStore::new(config.store.resolved_path());
    let mut records = store.load_all()?;

    if records.is_empty() {
        println!("Nenhum registro gravado ainda.");
        println!("Arquivo: {}", store.path().display());
        return Ok(());
    }

    records.sort_by(|a, b| b.queried_at.cmp(&a.queried_at));

    println!("Registros gravados ({} no total):\n", records.len());
    for record in records.iter().take(limit) {
        println!(
            "  {}  {:<3} {}  {}",
            format_cnpj(&record.id),
            record.region_code,
            record.queried_at_text(),
            record.business_name
        );
    }

    if records.len() > limit {
        println!("\n  ... e mais {} (use --limit)", records.len() - limit);
    }

    Ok(())
}

/// Diagnostica configuração, arquivo de registros e conectividade.
pub async fn doctor(config: &Config) -> ConsultaResult<()> {
    println!("Diagnosticando consulta-cnpj...\n");

    let mut issues: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    println!("✓ Configuração carregada");
    println!("  API: {}", config.registry.base_url);

    let store = RecordStore::new(config.store.resolved_path());
    if store.path().exists() {
        match store.load_all() {
            Ok(records) => println!(
                "✓ Arquivo de registros legível ({} registros): {}",
                records.len(),
                store.path().display()
            ),
            Err(e) => issues.push(e.to_string()),
        }
    } else {
        println!(
            "○ Arquivo de registros ainda não existe: {}",
            store.path().display()
        );
    }

    if config.network.probe_enabled {
        match TcpProbe::for_url(
            &config.registry.base_url,
            Duration::from_secs(config.network.probe_timeout_secs),
        ) {
            Ok(probe) => {
                if probe.is_network_available().await {
                    println!("✓ API acessível ({})", probe.target());
                } else {
                    warnings.push(format!(
                        "Sem conexão com {} - consultas novas serão rejeitadas",
                        probe.target()
                    ));
                }
            }
            Err(e) => issues.push(e.to_string()),
        }
    } else {
        println!("○ Verificação de conectividade desabilitada no config");
    }

    // Resumo
    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("✓ Tudo OK! consulta-cnpj está pronto para uso.");
    } else {
        if !warnings.is_empty() {
            println!("Avisos:");
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !issues.is_empty() {
            println!("Problemas:");
            for issue in issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

/// Configura opções interativamente.
pub fn config_cmd(config_path: &Path) -> ConsultaResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    // Mostra resumo antes de editar
    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Mostra versão.
pub fn version() {
    println!("consulta-cnpj {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Consulta de CNPJ com cache local e limite de consultas por minuto");
}

/// Converte erros de prompt do dialoguer.
pub(crate) fn prompt_error<E: std::fmt::Display>(e: E) -> ConsultaError {
    ConsultaError::other(format!("Erro no prompt: {}", e))
}
