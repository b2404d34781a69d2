//! Captura de Preço do Ouro - Série Temporal em Repositório Remoto
//!
//! Este programa consulta o preço do ouro em um feed externo a cada 60
//! segundos e registra cada cotação em um CSV diário mantido em um
//! repositório remoto (API de conteúdo do GitHub). Cada escrita é um ciclo
//! de leitura-modificação-escrita condicionado ao token de versão do
//! objeto; falhas viram linhas em um log de diagnóstico no mesmo
//! repositório e nunca derrubam o loop.
//!
//! Uso:
//!   GITHUB_TOKEN=ghp_xxx ./target/release/gold-capture
//!   DEBUG=1 INTERVAL_SECS=30 GITHUB_TOKEN=ghp_xxx ./target/release/gold-capture

mod append;
mod capture;
mod config;
mod feed;
mod logger;
mod store;
mod types;

use config::Config;
use logger::ErrorLog;
use store::GithubStore;

#[tokio::main]
async fn main() {
    // ========================================================================
    // Configuração via Variáveis de Ambiente
    // ========================================================================

    let config = Config::from_env();

    eprintln!("Feed de preço: {}", config.feed_url);
    eprintln!(
        "Repositório: {}/{} ({})",
        config.repo_owner, config.repo_name, config.database_path
    );
    eprintln!("Intervalo entre ciclos: {}s", config.interval.as_secs());
    if config.github_token.is_none() {
        eprintln!("AVISO: GITHUB_TOKEN não definido; nenhuma escrita será possível");
    }
    if config.debug {
        eprintln!("Modo debug: ATIVADO");
    }

    // ========================================================================
    // Clientes HTTP e Log de Diagnóstico
    // ========================================================================

    let client = reqwest::Client::new();

    let store = config
        .github_token
        .as_ref()
        .map(|token| GithubStore::new(client.clone(), token.clone(), &config));

    let log = ErrorLog::new(store.clone(), config.debug);

    // ========================================================================
    // Loop de Captura (um ciclo por intervalo, sem sobreposição)
    // ========================================================================

    eprintln!("Iniciando captura...\n");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut cycles = 0u64;

    loop {
        cycles += 1;
        log.trace(&format!("--- ciclo {cycles} ---"));

        capture::run_cycle(&client, &config.feed_url, store.as_ref(), &log).await;

        // Ctrl-C encerra entre ciclos, nunca no meio de uma escrita
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            _ = &mut shutdown => break,
        }
    }

    // ========================================================================
    // Finalização
    // ========================================================================

    eprintln!("\n=== Captura Encerrada ===");
    eprintln!("Ciclos executados: {cycles}");
}
