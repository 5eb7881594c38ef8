// src/client/query_client.rs
//
// Cache de consultas do cliente: uma entrada por chave (caminho da API),
// uma requisição em voo por chave, e invalidação explícita após escritas.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    client::invalidation::{covers, for_endpoint, for_resource},
    models::{auth::User, realtime::WsMessage},
};

const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Resposta de erro do servidor, com a mensagem do campo `error`.
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Uma escrita e as chaves que ela deixa velhas.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub invalidates: Vec<String>,
}

impl Mutation {
    /// Já vem com as chaves padrão do endpoint.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let invalidates = for_endpoint(&method, &endpoint);
        Self {
            method,
            endpoint,
            body: None,
            invalidates,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn invalidates(mut self, keys: &[&str]) -> Self {
        self.invalidates = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Chaves com busca em voo; `true` quando foram invalidadas no meio dela.
    pending: HashMap<String, bool>,
}

/// Um lock por chave: quem chega enquanto há busca em voo espera por ela.
#[derive(Default)]
struct InFlight {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InFlight {
    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Solta o lock e tira a chave do mapa se ninguém mais espera por ela.
    async fn release(&self, key: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut locks = self.locks.lock().await;
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[derive(Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    base_url: String,
    stale_time: Duration,
    cache: Arc<Mutex<CacheState>>,
    in_flight: Arc<InFlight>,
}

async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

impl QueryClient {
    /// O cookie de sessão fica no cookie store do `reqwest`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            stale_time: DEFAULT_STALE_TIME,
            cache: Arc::new(Mutex::new(CacheState::default())),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    fn url(&self, key: &str) -> String {
        format!("{}{}", self.base_url, key)
    }

    async fn fresh(&self, key: &str) -> Option<Value> {
        let cache = self.cache.lock().await;
        cache
            .entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.value.clone())
    }

    /// Leitura com cache. Chamadas simultâneas da mesma chave fazem uma só requisição.
    pub async fn query<T: DeserializeOwned>(&self, key: &str) -> Result<T, ClientError> {
        let value = self.query_value(key).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn query_value(&self, key: &str) -> Result<Value, ClientError> {
        if let Some(value) = self.fresh(key).await {
            return Ok(value);
        }

        let guard = self.in_flight.acquire(key).await;
        let result = self.fetch(key).await;
        self.in_flight.release(key, guard).await;
        result
    }

    /// Busca com o lock da chave já tomado. Uma resposta que chega depois de
    /// uma invalidação da chave vai para quem pediu, mas não entra no cache.
    async fn fetch(&self, key: &str) -> Result<Value, ClientError> {
        // Quem segurava o lock pode ter acabado de preencher a chave
        if let Some(value) = self.fresh(key).await {
            return Ok(value);
        }

        self.cache.lock().await.pending.insert(key.to_string(), false);
        let fetched = self.get_json(key).await;

        let mut cache = self.cache.lock().await;
        let invalidated = cache.pending.remove(key).unwrap_or(true);
        let value = fetched?;
        if !invalidated {
            cache.entries.insert(
                key.to_string(),
                CacheEntry {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(value)
    }

    async fn get_json(&self, key: &str) -> Result<Value, ClientError> {
        let response = self.http.get(self.url(key)).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Escrita. Só em caso de sucesso as chaves de `invalidates` saem do cache.
    pub async fn mutate(&self, mutation: Mutation) -> Result<Value, ClientError> {
        let mut request = self
            .http
            .request(mutation.method.clone(), self.url(&mutation.endpoint));
        if let Some(body) = &mutation.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let bytes = response.bytes().await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        self.invalidate(mutation.invalidates.as_slice()).await;
        Ok(value)
    }

    /// Remove as chaves e tudo que estiver abaixo delas.
    pub async fn invalidate<S: AsRef<str>>(&self, keys: &[S]) {
        if keys.is_empty() {
            return;
        }
        let covered = |cached: &str| keys.iter().any(|k| covers(k.as_ref(), cached));
        let mut cache = self.cache.lock().await;
        cache.entries.retain(|cached, _| !covered(cached.as_str()));
        for (key, invalidated) in cache.pending.iter_mut() {
            if covered(key.as_str()) {
                *invalidated = true;
            }
        }
    }

    pub async fn is_cached(&self, key: &str) -> bool {
        self.cache.lock().await.entries.contains_key(key)
    }

    /// Aplica um aviso do `/ws`. Só `data-changed` mexe no cache.
    pub async fn handle_message(&self, message: &WsMessage) {
        if let WsMessage::DataChanged { resource } = message {
            self.invalidate(for_resource(resource).as_slice()).await;
        }
    }

    /// Usuário da sessão. Sem sessão (401 ou `null`) é `Ok(None)`, nunca erro.
    /// Uma falha de rede é repetida uma vez; é a única repetição do cliente.
    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        let url = self.url("/api/current-user");
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(_) => self.http.get(&url).send().await?,
        };

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            s if s.is_success() => Ok(response.json::<Option<User>>().await?),
            _ => Err(api_error(response).await),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let value = self
            .mutate(Mutation::new(Method::POST, "/api/login").body(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.mutate(Mutation::new(Method::POST, "/api/logout")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_map_shrinks_after_each_fetch() {
        // Porta recusada: o erro também precisa soltar a chave
        let client = QueryClient::new("http://127.0.0.1:1").expect("client");
        assert!(client.query_value("/api/parts").await.is_err());
        assert!(client.query_value("/api/buildings").await.is_err());
        assert_eq!(client.in_flight.len().await, 0);
        assert!(client.cache.lock().await.pending.is_empty());
    }
}
