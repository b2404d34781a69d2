//! Ciclo de captura: cotação → partição do dia → append no repositório

use reqwest::Client;
use serde_json::Number;

use crate::append;
use crate::feed;
use crate::logger::ErrorLog;
use crate::store::ObjectStore;

/// Cabeçalho das partições diárias.
pub const CSV_HEADER: &str = "price18,date\n";

/// Deriva a chave de partição (AAAA-MM-DD) do timestamp reportado pelo feed.
///
/// A data vem antes do `T` do datetime ISO-8601. Nenhuma conversão de fuso:
/// a partição segue o fuso do próprio feed, não o relógio local.
pub fn partition_key(date: &str) -> &str {
    date.split('T').next().unwrap_or(date)
}

/// Produz o conteúdo novo da partição com a linha da cotação no final.
///
/// O conteúdo existente é preservado byte a byte; objeto novo começa pelo
/// cabeçalho.
pub fn render_row(existing: Option<&str>, price: &Number, date: &str) -> String {
    let mut content = match existing {
        Some(text) => text.to_string(),
        None => CSV_HEADER.to_string(),
    };
    content.push_str(&format!("{},{}\n", price, date));
    content
}

/// Executa um ciclo completo de captura.
///
/// Qualquer falha encerra só este ciclo e vira uma entrada no log de
/// diagnóstico; nada propaga para o loop externo. Sem credencial, o ciclo
/// termina antes de qualquer chamada de rede.
pub async fn run_cycle<S: ObjectStore>(
    client: &Client,
    feed_url: &str,
    store: Option<&S>,
    log: &ErrorLog<S>,
) {
    let Some(store) = store else {
        log.log("GITHUB_TOKEN ausente nas variáveis de ambiente").await;
        return;
    };

    log.trace("consultando o feed de preço...");
    let quote = match feed::fetch_quote(client, feed_url).await {
        Ok(quote) => quote,
        Err(err) => {
            log.log(&format!("falha ao obter a cotação do ouro: {err}")).await;
            return;
        }
    };

    let name = format!("{}.csv", partition_key(&quote.date));
    let message = format!("Update {name}");
    log.trace(&format!("registrando {},{} em {name}", quote.price18, quote.date));

    let result = append::append_line(store, &name, &message, |existing| {
        render_row(existing, &quote.price18, &quote.date)
    })
    .await;

    match result {
        Ok(()) => log.trace(&format!("cotação registrada em {name}")),
        Err(err) => log.log(&err.to_string()).await,
    }
}
