//! Protocolo de append sobre o repositório de objetos versionados
//!
//! Ciclo de leitura-modificação-escrita em tentativa única: lê o objeto,
//! produz o conteúdo novo com a linha no final e grava de volta preso ao
//! token de versão lido. Objeto inexistente é bootstrap, não erro. Conflito
//! de versão é reportado, não resolvido: com um único escritor por chave a
//! cada ciclo, um conflito é situação anormal.

use crate::store::{ObjectStore, StoreError};

/// Falhas de um ciclo de append.
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("falha ao ler {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("falha ao gravar {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("conflito de versão em {name}")]
    Conflict { name: String },
}

/// Executa um ciclo de append sobre `name`.
///
/// `render` recebe o conteúdo atual decodificado (`None` se o objeto ainda
/// não existe) e devolve o conteúdo completo novo. Falha na leitura
/// interrompe o ciclo antes de qualquer escrita; a recuperação fica por
/// conta do próximo ciclo do loop externo.
///
/// # Argumentos
/// * `store` - repositório de objetos
/// * `name` - nome do objeto alvo
/// * `message` - mensagem de commit da escrita
/// * `render` - produz o conteúdo novo a partir do atual
pub async fn append_line<S, F>(
    store: &S,
    name: &str,
    message: &str,
    render: F,
) -> Result<(), AppendError>
where
    S: ObjectStore,
    F: FnOnce(Option<&str>) -> String,
{
    let existing = store.get(name).await.map_err(|source| AppendError::Read {
        name: name.to_string(),
        source,
    })?;

    let (new_content, expected_version) = match &existing {
        Some(object) => (render(Some(&object.content)), Some(object.version.as_str())),
        None => (render(None), None),
    };

    match store.put(name, &new_content, message, expected_version).await {
        Ok(()) => Ok(()),
        Err(StoreError::Conflict { name }) => Err(AppendError::Conflict { name }),
        Err(source) => Err(AppendError::Write {
            name: name.to_string(),
            source,
        }),
    }
}
