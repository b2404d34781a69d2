//! Log de diagnóstico no repositório remoto (melhor esforço)

use chrono::{DateTime, Utc};

use crate::append;
use crate::store::ObjectStore;

/// Nome fixo do objeto de log, no mesmo diretório das partições de dados.
pub const LOG_OBJECT: &str = "server.log";

/// Log de erros remoto, fire-and-forget.
///
/// Reusa o protocolo de append contra um objeto fixo. Toda falha interna é
/// engolida: este componente registra falhas dos outros e não pode virar
/// uma nova fonte de falha.
pub struct ErrorLog<S> {
    store: Option<S>,
    debug: bool,
}

impl<S: ObjectStore> ErrorLog<S> {
    pub fn new(store: Option<S>, debug: bool) -> Self {
        Self { store, debug }
    }

    /// Eco local de diagnóstico, apenas com DEBUG=1.
    pub fn trace(&self, message: &str) {
        if self.debug {
            eprintln!("{message}");
        }
    }

    /// Registra uma falha: eco no stderr + linha com timestamp no log remoto.
    pub async fn log(&self, message: &str) {
        eprintln!("{message}");

        let Some(store) = &self.store else {
            self.trace("log remoto indisponível sem GITHUB_TOKEN");
            return;
        };

        let now = Utc::now();
        let line = format_line(now, message);
        let commit = format!("Update {} - {}", LOG_OBJECT, now.format("%Y-%m-%d"));

        let result = append::append_line(store, LOG_OBJECT, &commit, |existing| {
            let mut content = existing.unwrap_or_default().to_string();
            content.push_str(&line);
            content
        })
        .await;

        // Falha ao registrar a falha: descarta, senão vira recursão
        if let Err(err) = result {
            self.trace(&format!("falha ao atualizar {LOG_OBJECT}: {err}"));
        }
    }
}

/// Formata uma linha do log: `[AAAA-MM-DD HH:MM:SS] mensagem`.
fn format_line(now: DateTime<Utc>, message: &str) -> String {
    format!("[{}] {}\n", now.format("%Y-%m-%d %H:%M:%S"), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn linha_tem_timestamp_entre_colchetes() {
        let now = Utc.with_ymd_and_hms(2025, 1, 4, 7, 5, 9).unwrap();
        assert_eq!(
            format_line(now, "falha qualquer"),
            "[2025-01-04 07:05:09] falha qualquer\n"
        );
    }

    #[tokio::test]
    async fn acumula_linhas_no_objeto_de_log() {
        let store = MemoryStore::new();
        let log = ErrorLog::new(Some(store.clone()), false);

        log.log("primeira falha").await;
        log.log("segunda falha").await;

        let content = store.content_of(LOG_OBJECT).expect("log criado");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("primeira falha"));
        assert!(lines[1].ends_with("segunda falha"));
    }

    #[tokio::test]
    async fn falha_do_proprio_log_e_engolida() {
        let store = MemoryStore::new();
        store.set_fail_put(true);
        let log = ErrorLog::new(Some(store.clone()), false);

        // Não pode propagar nem entrar em pânico
        log.log("falha original").await;

        assert!(store.content_of(LOG_OBJECT).is_none());
    }

    #[tokio::test]
    async fn sem_repositorio_vira_so_eco_local() {
        let log: ErrorLog<MemoryStore> = ErrorLog::new(None, false);
        log.log("falha sem token").await;
    }
}
