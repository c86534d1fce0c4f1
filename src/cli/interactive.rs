//! Configuração interativa do consulta-cnpj.
//!
//! Este módulo implementa a configuração interativa usando dialoguer.

use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use super::commands::prompt_error;
use crate::types::config::{default_store_path, Config};
use crate::ConsultaResult;

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> ConsultaResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Configuração Interativa do consulta-cnpj\n");

    // Carrega config existente ou cria nova
    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Criando nova configuração...\n");
        Config::default_config()
    };

    // Menu principal
    loop {
        let options = vec![
            "Configurações Gerais",
            "API de consulta",
            "Arquivo de registros",
            "Conectividade",
            "Salvar e Sair",
            "Sair sem Salvar",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("O que deseja configurar?")
            .items(&options)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_registry(&theme, &mut config)?,
            2 => configure_store(&theme, &mut config)?,
            3 => configure_network(&theme, &mut config)?,
            4 => {
                config.save(config_path)?;
                println!("\n✓ Configuração salva em: {}\n", config_path.display());
                break;
            }
            5 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Deseja realmente sair sem salvar?")
                    .default(false)
                    .interact()
                    .map_err(prompt_error)?
                {
                    println!("\nSaindo sem salvar.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Configura opções gerais.
fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> ConsultaResult<()> {
    println!("\n📋 Configurações Gerais\n");

    // Log level
    let log_levels = vec!["error", "warn", "info", "debug", "trace"];
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Nível de log")
        .items(&log_levels)
        .default(current_idx)
        .interact()
        .map_err(prompt_error)?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    // Log format
    let log_formats = vec!["text", "json"];
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Formato de log")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()
        .map_err(prompt_error)?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ Configurações gerais atualizadas.\n");
    Ok(())
}

/// Configura a API.
fn configure_registry(theme: &ColorfulTheme, config: &mut Config) -> ConsultaResult<()> {
    println!("\n🌐 API de consulta\n");

    let base_url: String = Input::with_theme(theme)
        .with_prompt("URL base (o CNPJ é adicionado ao final)")
        .default(config.registry.base_url.clone())
        .interact_text()
        .map_err(prompt_error)?;

    config.registry.base_url = base_url.trim().to_string();

    let timeout: u64 = Input::with_theme(theme)
        .with_prompt("Timeout da requisição (segundos)")
        .default(config.registry.timeout_secs)
        .interact_text()
        .map_err(prompt_error)?;

    config.registry.timeout_secs = timeout.max(1);

    println!("\n✓ API configurada.\n");
    Ok(())
}

/// Configura o arquivo de registros.
fn configure_store(theme: &ColorfulTheme, config: &mut Config) -> ConsultaResult<()> {
    println!("\n💾 Arquivo de registros\n");

    let use_default = Confirm::with_theme(theme)
        .with_prompt(format!(
            "Usar o local padrão ({})?",
            default_store_path().display()
        ))
        .default(config.store.path.is_none())
        .interact()
        .map_err(prompt_error)?;

    if use_default {
        config.store.path = None;
    } else {
        let path: String = Input::with_theme(theme)
            .with_prompt("Caminho do arquivo CSV")
            .default(config.store.resolved_path().display().to_string())
            .interact_text()
            .map_err(prompt_error)?;

        config.store.path = Some(PathBuf::from(path.trim()));
    }

    println!("\n✓ Arquivo de registros configurado.\n");
    Ok(())
}

/// Configura a verificação de conectividade.
fn configure_network(theme: &ColorfulTheme, config: &mut Config) -> ConsultaResult<()> {
    println!("\n📡 Conectividade\n");

    config.network.probe_enabled = Confirm::with_theme(theme)
        .with_prompt("Verificar conexão antes de consultar a API?")
        .default(config.network.probe_enabled)
        .interact()
        .map_err(prompt_error)?;

    if !config.network.probe_enabled {
        println!("Verificação desabilitada.\n");
        return Ok(());
    }

    let timeout: u64 = Input::with_theme(theme)
        .with_prompt("Timeout da verificação (segundos)")
        .default(config.network.probe_timeout_secs)
        .interact_text()
        .map_err(prompt_error)?;

    config.network.probe_timeout_secs = timeout.max(1);

    println!("\n✓ Conectividade configurada.\n");
    Ok(())
}

/// Mostra resumo da configuração.
pub fn show_config_summary(config: &Config) {
    println!("\n📊 Resumo da Configuração\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ Geral                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ API                                     │");
    println!("├─────────────────────────────────────────┤");
    println!("│ URL: {:<34} │", config.registry.base_url);
    println!("│ Timeout: {:<29}s │", config.registry.timeout_secs);
    println!("├─────────────────────────────────────────┤");
    println!("│ Registros                               │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Arquivo: {:<30} │",
        config.store.resolved_path().display().to_string()
    );
    println!("├─────────────────────────────────────────┤");
    println!("│ Conectividade                           │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Verificação: {:<26} │",
        if config.network.probe_enabled {
            "Sim"
        } else {
            "Não"
        }
    );
    println!("└─────────────────────────────────────────┘");
    println!();
}
