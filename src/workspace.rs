//! The context object every view receives: remote client, query cache and
//! session, constructed once at startup.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheLayer, MemoryStorage, QueryKey};
use crate::config::Config;
use crate::remote::{decode_rows, RemoteStore, RestClient, SelectQuery};
use crate::resources::Resource;

/// Cache keys used by the workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkspaceQueryKey {
  /// Every row of a table; the key is the table name itself
  Collection(&'static str),
  /// Favorites of one user joined with their provider
  Favorites { user_id: String },
}

impl QueryKey for WorkspaceQueryKey {
  fn cache_key(&self) -> String {
    match self {
      Self::Collection(table) => table.to_string(),
      Self::Favorites { user_id } => format!("favorites:{}", user_id),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::Collection(table) => format!("all {}", table),
      Self::Favorites { user_id } => format!("favorites of {}", user_id),
    }
  }
}

#[derive(Clone)]
pub struct Workspace {
  remote: Arc<dyn RemoteStore>,
  cache: CacheLayer<MemoryStorage>,
  session_user: Option<String>,
  bucket: String,
}

impl Workspace {
  /// Connect to the backend described by `config`.
  pub fn connect(config: &Config, session_user: Option<String>) -> Result<Self> {
    let remote = RestClient::new(config)?;

    Ok(
      Self::with_remote(Arc::new(remote), config.stale_time())
        .with_session(session_user)
        .with_bucket(config.storage.bucket.clone()),
    )
  }

  pub fn with_remote(remote: Arc<dyn RemoteStore>, stale_time: Duration) -> Self {
    Self {
      remote,
      cache: CacheLayer::new(MemoryStorage::new()).with_stale_time(stale_time),
      session_user: None,
      bucket: crate::config::DEFAULT_BUCKET.to_string(),
    }
  }

  pub fn with_session(mut self, user_id: Option<String>) -> Self {
    self.session_user = user_id.filter(|id| !id.trim().is_empty());
    self
  }

  pub fn with_bucket(mut self, bucket: String) -> Self {
    self.bucket = bucket;
    self
  }

  /// Signed-in user, if any.
  pub fn session_user(&self) -> Option<&str> {
    self.session_user.as_deref()
  }

  pub fn bucket(&self) -> &str {
    &self.bucket
  }

  /// Shared handle, so a spawned read can outlive the borrow of the workspace.
  pub fn remote(&self) -> Arc<dyn RemoteStore> {
    Arc::clone(&self.remote)
  }

  pub fn cache(&self) -> &CacheLayer<MemoryStorage> {
    &self.cache
  }

  /// Every row of `R`'s table, served from cache unless stale or invalidated.
  pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
    let table = R::INFO.table;
    let remote = self.remote();

    let result = self
      .cache
      .fetch(&WorkspaceQueryKey::Collection(table), || async move {
        let rows = remote.select(table, &SelectQuery::all()).await?;
        decode_rows::<R>(table, rows)
      })
      .await?;
    tracing::debug!(
      table,
      source = ?result.source,
      cached_at = ?result.cached_at,
      "collection read"
    );

    Ok(result.data)
  }

  /// Drop `R`'s cached list so the next read goes to the backend.
  pub fn invalidate<R: Resource>(&self) -> Result<()> {
    self
      .cache
      .invalidate(&WorkspaceQueryKey::Collection(R::INFO.table))
  }

  /// Insert one record into `R`'s table and invalidate its cached list.
  ///
  /// Only a failed insert is an error. Returned rows that do not decode into
  /// `R` are logged and left out, since the record is already stored.
  pub async fn add<R: Resource>(&self, record: &R::New) -> Result<Vec<R>> {
    let table = R::INFO.table;
    let row = serde_json::to_value(record)
      .map_err(|e| eyre!("Failed to serialize {} record: {}", table, e))?;

    let rows = self.remote.insert(table, row).await?;
    if let Err(e) = self.invalidate::<R>() {
      tracing::warn!(table, error = %e, "failed to invalidate collection");
    }
    tracing::info!(table, "record added");

    Ok(
      rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<R>(row) {
          Ok(record) => Some(record),
          Err(e) => {
            tracing::warn!(table, error = %e, "inserted row did not decode");
            None
          }
        })
        .collect(),
    )
  }
}
