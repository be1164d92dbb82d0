//! The seam between the app and the hosted backend.

use async_trait::async_trait;
use color_eyre::Result;
use serde_json::Value;

/// Equality filter on one column (`column=eq.value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
  pub column: String,
  pub value: String,
}

impl Filter {
  pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      column: column.into(),
      value: value.into(),
    }
  }

  /// Query-string pair in the table API's operator syntax.
  pub fn to_query_pair(&self) -> (String, String) {
    (self.column.clone(), format!("eq.{}", self.value))
  }
}

/// Column projection plus row filters for a table read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
  pub columns: String,
  pub filters: Vec<Filter>,
}

impl SelectQuery {
  /// Every column of every row.
  pub fn all() -> Self {
    Self::columns("*")
  }

  /// A projection; may embed related tables, e.g. `provider_id,providers(name)`.
  pub fn columns(columns: impl Into<String>) -> Self {
    Self {
      columns: columns.into(),
      filters: Vec::new(),
    }
  }

  pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
    self.filters.push(Filter::eq(column, value));
    self
  }
}

impl Default for SelectQuery {
  fn default() -> Self {
    Self::all()
  }
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
  /// Bucket-qualified key, e.g. `files_bucket/public/logo.png`
  pub key: String,
}

/// Table reads/writes and object storage of the hosted backend.
///
/// All failures carry the backend's own message.
#[async_trait]
pub trait RemoteStore: Send + Sync {
  /// Read rows of `table`.
  async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>>;

  /// Insert one row and return the stored representation.
  async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>>;

  /// Delete every row matching all `filters`.
  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()>;

  /// Store `bytes` at `path` inside `bucket`.
  async fn upload(
    &self,
    bucket: &str,
    path: &str,
    bytes: Vec<u8>,
    content_type: &str,
  ) -> Result<StoredObject>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_select_query_builder() {
    let query = SelectQuery::columns("id,name").eq("user_id", "u1");
    assert_eq!(query.columns, "id,name");
    assert_eq!(
      query.filters[0].to_query_pair(),
      ("user_id".to_string(), "eq.u1".to_string())
    );
    assert_eq!(SelectQuery::default().columns, "*");
  }
}
