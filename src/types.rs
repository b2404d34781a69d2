//! Tipos e estruturas de dados

use serde::Deserialize;

/// Cotação do ouro retornada pelo feed externo.
///
/// `price18` fica como [`serde_json::Number`] para preservar o texto
/// numérico do feed byte a byte na linha do CSV (sem reformatação de float).
#[derive(Debug, Clone, Deserialize)]
pub struct GoldQuote {
    pub price18: serde_json::Number,
    pub date: String, // Timestamp ISO-8601 no fuso reportado pelo feed
}
