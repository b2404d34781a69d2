//! Configuração via variáveis de ambiente

use std::time::Duration;

/// Feed público de preço do ouro.
pub const DEFAULT_FEED_URL: &str = "https://milli.gold/api/v1/public/milli-price/external";

/// Base da API de conteúdo do repositório.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const DEFAULT_REPO_OWNER: &str = "D3rhami";
const DEFAULT_REPO_NAME: &str = "milli-gold-capture";
const DEFAULT_DATABASE_PATH: &str = "database";

/// Configuração imutável do processo, carregada uma única vez no startup
/// e passada explicitamente para os clientes.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub repo_owner: String,
    pub repo_name: String,
    pub database_path: String,
    pub feed_url: String,
    pub api_url: String,
    pub interval: Duration,
    pub debug: bool,
}

impl Config {
    /// Carrega a configuração das variáveis de ambiente.
    ///
    /// Tudo tem default de produção; só o `GITHUB_TOKEN` não tem fallback —
    /// a ausência dele vira um erro de configuração reportado a cada ciclo.
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Self {
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            repo_owner: std::env::var("REPO_OWNER")
                .unwrap_or_else(|_| DEFAULT_REPO_OWNER.to_string()),
            repo_name: std::env::var("REPO_NAME")
                .unwrap_or_else(|_| DEFAULT_REPO_NAME.to_string()),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            feed_url: std::env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            interval: Duration::from_secs(interval_secs),
            debug: std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string()) == "1",
        }
    }
}
