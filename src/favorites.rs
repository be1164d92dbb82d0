//! Favorite providers of the signed-in user.

use color_eyre::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::remote::{decode_rows, Filter, SelectQuery};
use crate::workspace::{Workspace, WorkspaceQueryKey};

const TABLE: &str = "favorites";
const COLUMNS: &str = "provider_id,providers(id,name,category,imageUrl)";

/// A favorites row joined with its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
  #[serde(deserialize_with = "lenient_id")]
  pub provider_id: String,
  /// Missing when the provider row is gone or hidden from this user
  #[serde(default)]
  pub providers: Option<Provider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
  #[serde(deserialize_with = "lenient_id")]
  pub id: String,
  pub name: String,
  pub category: Option<String>,
  #[serde(rename = "imageUrl")]
  pub image_url: Option<String>,
}

impl Favorite {
  pub fn name(&self) -> &str {
    self
      .providers
      .as_ref()
      .map(|p| p.name.as_str())
      .unwrap_or(&self.provider_id)
  }

  pub fn category(&self) -> Option<&str> {
    self.providers.as_ref().and_then(|p| p.category.as_deref())
  }
}

/// Provider ids are integers in some schemas and uuids in others.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    other => Err(serde::de::Error::custom(format!(
      "expected string or number id, got {}",
      other
    ))),
  }
}

fn favorites_key(user_id: &str) -> WorkspaceQueryKey {
  WorkspaceQueryKey::Favorites {
    user_id: user_id.to_string(),
  }
}

/// Favorites of `user_id`, cached under `favorites:<user_id>`.
pub async fn fetch_favorites(ws: &Workspace, user_id: &str) -> Result<Vec<Favorite>> {
  let remote = ws.remote();
  let query = SelectQuery::columns(COLUMNS).eq("user_id", user_id);

  let result = ws
    .cache()
    .fetch(&favorites_key(user_id), || async move {
      let rows = remote.select(TABLE, &query).await?;
      decode_rows::<Favorite>(TABLE, rows)
    })
    .await?;

  Ok(result.data)
}

/// Drop the cached favorites of `user_id`.
pub fn invalidate_favorites(ws: &Workspace, user_id: &str) -> Result<()> {
  ws.cache().invalidate(&favorites_key(user_id))
}

/// Delete the `(user_id, provider_id)` favorites row, then invalidate the
/// user's favorites so the next read refetches.
pub async fn remove_favorite(ws: &Workspace, user_id: &str, provider_id: &str) -> Result<()> {
  let filters = [
    Filter::eq("user_id", user_id),
    Filter::eq("provider_id", provider_id),
  ];

  ws.remote().delete(TABLE, &filters).await?;
  invalidate_favorites(ws, user_id)?;
  tracing::info!(user_id, provider_id, "favorite removed");

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MemoryStore;
  use serde_json::json;
  use std::sync::Arc;
  use std::time::Duration;

  fn acme_row(user_id: &str) -> Value {
    json!({
      "user_id": user_id,
      "provider_id": "p1",
      "providers": {"id": "p1", "name": "Acme", "category": "cleaning", "imageUrl": "https://img/acme.png"}
    })
  }

  #[test]
  fn test_decode_numeric_ids() {
    let favorite: Favorite = serde_json::from_value(json!({
      "provider_id": 7,
      "providers": {"id": 7, "name": "Bolt", "category": null, "imageUrl": null}
    }))
    .unwrap();
    assert_eq!(favorite.provider_id, "7");
    assert_eq!(favorite.name(), "Bolt");
    assert!(favorite.category().is_none());
  }

  #[test]
  fn test_missing_provider_falls_back_to_id() {
    let favorite: Favorite = serde_json::from_value(json!({"provider_id": "p9"})).unwrap();
    assert_eq!(favorite.name(), "p9");
  }

  #[tokio::test]
  async fn test_fetch_filters_by_user_and_caches() {
    let store = Arc::new(MemoryStore::new());
    store.seed("favorites", vec![acme_row("u1"), acme_row("u2")]);
    let ws = Workspace::with_remote(store.clone(), Duration::from_secs(300));

    let favorites = fetch_favorites(&ws, "u1").await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].name(), "Acme");
    assert_eq!(favorites[0].category(), Some("cleaning"));

    fetch_favorites(&ws, "u1").await.unwrap();
    assert_eq!(store.select_count("favorites"), 1);
  }

  #[tokio::test]
  async fn test_remove_deletes_and_refetches() {
    let store = Arc::new(MemoryStore::new());
    store.seed("favorites", vec![acme_row("u1")]);
    let ws = Workspace::with_remote(store.clone(), Duration::from_secs(300));

    assert_eq!(fetch_favorites(&ws, "u1").await.unwrap().len(), 1);
    remove_favorite(&ws, "u1", "p1").await.unwrap();

    assert_eq!(
      store.deletes(),
      vec![(
        "favorites".to_string(),
        vec![Filter::eq("user_id", "u1"), Filter::eq("provider_id", "p1")]
      )]
    );
    assert!(fetch_favorites(&ws, "u1").await.unwrap().is_empty());
    assert_eq!(store.select_count("favorites"), 2);
  }

  #[tokio::test]
  async fn test_failed_remove_keeps_cache() {
    let store = Arc::new(MemoryStore::new());
    store.seed("favorites", vec![acme_row("u1")]);
    store.fail_deletes("favorites", "permission denied");
    let ws = Workspace::with_remote(store.clone(), Duration::from_secs(300));

    fetch_favorites(&ws, "u1").await.unwrap();
    let err = remove_favorite(&ws, "u1", "p1").await.unwrap_err();
    assert_eq!(err.to_string(), "permission denied");

    assert_eq!(fetch_favorites(&ws, "u1").await.unwrap().len(), 1);
    assert_eq!(store.select_count("favorites"), 1);
  }
}
