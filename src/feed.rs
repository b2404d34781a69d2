//! Consulta do feed externo de preço do ouro

use std::time::Duration;

use reqwest::{header, Client, StatusCode};

use crate::types::GoldQuote;

/// Timeout da consulta de preço.
const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// User-Agent de navegador: o feed rejeita clientes HTTP genéricos.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";

/// Falhas na obtenção de uma cotação.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("falha na consulta do feed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("resposta inesperada do feed ({0})")]
    Status(StatusCode),
}

/// Busca uma cotação no feed.
///
/// # Retorno
/// A cotação decodificada, ou [`FeedError`] para falha de rede, status
/// não-2xx ou payload que não bate com o esperado.
pub async fn fetch_quote(client: &Client, url: &str) -> Result<GoldQuote, FeedError> {
    let response = client
        .get(url)
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .header(header::ACCEPT, "application/json")
        .timeout(FEED_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status));
    }

    Ok(response.json::<GoldQuote>().await?)
}
