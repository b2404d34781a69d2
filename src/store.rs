//! Cliente do repositório remoto de objetos versionados
//!
//! Cada arquivo do diretório de dados é um objeto nomeado com um token de
//! versão opaco (o `sha` do blob na API de conteúdo). A leitura devolve
//! conteúdo decodificado + token; a escrita é condicionada ao token: o
//! repositório rejeita a gravação se a versão atual divergir (concorrência
//! otimista). O token nunca é interpretado localmente, só devolvido intacto.
//!
//! Sem retry e sem cache: uma chamada HTTP por operação, com timeout de 30s.
//! Quem decide o que fazer com uma falha é o chamador.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;

/// Timeout das chamadas de leitura/escrita no repositório.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A API de conteúdo rejeita requisições sem User-Agent.
const CLIENT_USER_AGENT: &str = "gold-capture/0.1";

/// Objeto remoto existente: conteúdo decodificado + token de versão.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content: String,
    pub version: String,
}

/// Erros do cliente do repositório.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("erro de rede ao acessar o repositório: {0}")]
    Request(#[from] reqwest::Error),

    #[error("resposta inesperada do repositório ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("conflito de versão ao gravar {name}")]
    Conflict { name: String },

    #[error("conteúdo inválido em {name}: {reason}")]
    Decode { name: String, reason: String },
}

/// Acesso genérico a objetos nomeados em um repositório versionado.
///
/// `get` distingue três saídas: objeto existe (`Some`), objeto ainda não
/// existe (`None`) e a chamada em si falhou (`Err`). `put` sem
/// `expected_version` só vale para objeto novo; com token, o repositório
/// rejeita a escrita se a versão atual for outra.
#[async_trait]
pub trait ObjectStore {
    async fn get(&self, name: &str) -> Result<Option<StoredObject>, StoreError>;

    async fn put(
        &self,
        name: &str,
        content: &str,
        message: &str,
        expected_version: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Resposta do GET de conteúdo: payload base64 + sha do blob.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

/// Cliente da API de conteúdo do GitHub.
#[derive(Debug, Clone)]
pub struct GithubStore {
    client: Client,
    token: String,
    contents_url: String,
}

impl GithubStore {
    /// Cria o cliente apontando para o diretório de dados do repositório
    /// configurado.
    pub fn new(client: Client, token: String, config: &Config) -> Self {
        let contents_url = format!(
            "{}/repos/{}/{}/contents/{}",
            config.api_url.trim_end_matches('/'),
            config.repo_owner,
            config.repo_name,
            config.database_path,
        );

        Self {
            client,
            token,
            contents_url,
        }
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/{}", self.contents_url, name)
    }

    /// Aplica credencial, headers da API e timeout a uma requisição.
    fn prepare(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::USER_AGENT, CLIENT_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl ObjectStore for GithubStore {
    async fn get(&self, name: &str) -> Result<Option<StoredObject>, StoreError> {
        let response = self.prepare(self.client.get(self.object_url(name))).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body: ContentsResponse = response.json().await?;
                let content = decode_content(name, &body.content)?;
                Ok(Some(StoredObject {
                    content,
                    version: body.sha,
                }))
            }
            // 404 é "objeto ainda não existe", não é erro
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn put(
        &self,
        name: &str,
        content: &str,
        message: &str,
        expected_version: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
        });
        if let Some(sha) = expected_version {
            body["sha"] = serde_json::Value::from(sha);
        }

        let response = self
            .prepare(self.client.put(self.object_url(name)))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            // 409: sha desatualizado; 422: criação sobre objeto que já existe
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(StoreError::Conflict {
                name: name.to_string(),
            }),
            status => Err(StoreError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Decodifica o payload base64 da API, que vem quebrado em linhas.
fn decode_content(name: &str, raw: &str) -> Result<String, StoreError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| StoreError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    String::from_utf8(bytes).map_err(|e| StoreError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
pub mod testing {
    //! Repositório em memória com a mesma semântica de token de versão do
    //! repositório remoto, para os testes do protocolo de append.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone)]
    struct Entry {
        content: String,
        revision: u64,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        objects: Arc<Mutex<HashMap<String, Entry>>>,
        fail_get: Arc<Mutex<bool>>,
        fail_put: Arc<Mutex<bool>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn content_of(&self, name: &str) -> Option<String> {
            self.objects
                .lock()
                .unwrap()
                .get(name)
                .map(|entry| entry.content.clone())
        }

        pub fn names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
            names.sort();
            names
        }

        /// Simula um escritor concorrente: troca o conteúdo e avança a
        /// revisão, invalidando qualquer token lido antes.
        pub fn overwrite(&self, name: &str, content: &str) {
            let mut objects = self.objects.lock().unwrap();
            let revision = objects.get(name).map(|e| e.revision + 1).unwrap_or(1);
            objects.insert(
                name.to_string(),
                Entry {
                    content: content.to_string(),
                    revision,
                },
            );
        }

        pub fn set_fail_get(&self, fail: bool) {
            *self.fail_get.lock().unwrap() = fail;
        }

        pub fn set_fail_put(&self, fail: bool) {
            *self.fail_put.lock().unwrap() = fail;
        }

        fn token(name: &str, revision: u64) -> String {
            format!("{name}@{revision}")
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn get(&self, name: &str) -> Result<Option<StoredObject>, StoreError> {
            if *self.fail_get.lock().unwrap() {
                return Err(StoreError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "indisponível".to_string(),
                });
            }

            let objects = self.objects.lock().unwrap();
            Ok(objects.get(name).map(|entry| StoredObject {
                content: entry.content.clone(),
                version: Self::token(name, entry.revision),
            }))
        }

        async fn put(
            &self,
            name: &str,
            content: &str,
            _message: &str,
            expected_version: Option<&str>,
        ) -> Result<(), StoreError> {
            if *self.fail_put.lock().unwrap() {
                return Err(StoreError::Status {
                    status: StatusCode::BAD_GATEWAY,
                    body: "indisponível".to_string(),
                });
            }

            let mut objects = self.objects.lock().unwrap();
            let current = objects
                .get(name)
                .map(|entry| (Self::token(name, entry.revision), entry.revision));

            let conflict = match (&current, expected_version) {
                // Criação sobre objeto que já existe
                (Some(_), None) => true,
                // Token que não bate com a revisão atual
                (Some((token, _)), Some(sha)) => sha != token.as_str(),
                // Token apontando para objeto que não existe
                (None, Some(_)) => true,
                (None, None) => false,
            };

            if conflict {
                return Err(StoreError::Conflict {
                    name: name.to_string(),
                });
            }

            let revision = current.map(|(_, r)| r + 1).unwrap_or(1);
            objects.insert(
                name.to_string(),
                Entry {
                    content: content.to_string(),
                    revision,
                },
            );
            Ok(())
        }
    }
}
