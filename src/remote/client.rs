use crate::config::Config;
use crate::remote::api_types::{error_message, ApiStoredObject};
use crate::remote::store::{Filter, RemoteStore, SelectQuery, StoredObject};
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// HTTP client for the backend's table API (`/rest/v1`) and storage API
/// (`/storage/v1`).
#[derive(Clone)]
pub struct RestClient {
  http: reqwest::Client,
  base: Url,
  api_key: String,
}

impl RestClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base = config.project_url()?;
    let api_key = Config::get_api_key()?;
    Self::with_credentials(base, api_key, config.request_timeout())
  }

  pub fn with_credentials(base: Url, api_key: String, timeout: Duration) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      api_key,
    })
  }

  fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| eyre!("Backend URL cannot carry a path: {}", self.base))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn table_url(&self, table: &str) -> Result<Url> {
    self.endpoint(["rest", "v1", table])
  }

  fn object_url(&self, bucket: &str, path: &str) -> Result<Url> {
    self.endpoint(
      ["storage", "v1", "object", bucket]
        .into_iter()
        .chain(path.split('/').filter(|s| !s.is_empty())),
    )
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    self
      .http
      .request(method, url)
      .header("apikey", &self.api_key)
      .bearer_auth(&self.api_key)
  }

  /// Send a request, turning any non-2xx answer into the backend's message.
  async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
    let response = request
      .send()
      .await
      .map_err(|e| eyre!("Failed to {}: {}", action, e))?;

    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);
    tracing::warn!(%status, %message, "{} rejected", action);
    Err(eyre!(message))
  }
}

#[async_trait]
impl RemoteStore for RestClient {
  async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>> {
    let url = self.table_url(table)?;
    let mut params = vec![("select".to_string(), query.columns.clone())];
    params.extend(query.filters.iter().map(Filter::to_query_pair));

    tracing::debug!(table, columns = %query.columns, filters = query.filters.len(), "select");

    let response = self
      .send(
        self.request(Method::GET, url).query(&params),
        &format!("read {}", table),
      )
      .await?;

    response
      .json::<Vec<Value>>()
      .await
      .map_err(|e| eyre!("Failed to parse {} response: {}", table, e))
  }

  async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>> {
    let url = self.table_url(table)?;

    tracing::debug!(table, "insert");

    let response = self
      .send(
        self
          .request(Method::POST, url)
          .header("Prefer", "return=representation")
          .json(&[row]),
        &format!("insert into {}", table),
      )
      .await?;

    response
      .json::<Vec<Value>>()
      .await
      .map_err(|e| eyre!("Failed to parse {} insert response: {}", table, e))
  }

  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
    let url = self.table_url(table)?;
    let params: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();

    tracing::debug!(table, filters = filters.len(), "delete");

    self
      .send(
        self
          .request(Method::DELETE, url)
          .header("Prefer", "return=minimal")
          .query(&params),
        &format!("delete from {}", table),
      )
      .await?;

    Ok(())
  }

  async fn upload(
    &self,
    bucket: &str,
    path: &str,
    bytes: Vec<u8>,
    content_type: &str,
  ) -> Result<StoredObject> {
    let url = self.object_url(bucket, path)?;

    tracing::debug!(bucket, path, size = bytes.len(), "upload");

    let response = self
      .send(
        self
          .request(Method::POST, url)
          .header(CONTENT_TYPE, content_type)
          .header("x-upsert", "false")
          .body(bytes),
        &format!("upload {}", path),
      )
      .await?;

    let stored: ApiStoredObject = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse upload response for {}: {}", path, e))?;

    Ok(StoredObject { key: stored.key })
  }
}
