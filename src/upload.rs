//! PNG upload into the workspace's storage bucket.

use color_eyre::{eyre::eyre, Result};
use futures::{stream, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};

use crate::remote::StoredObject;
use crate::workspace::Workspace;

const CONTENT_TYPE: &str = "image/png";

/// A local file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
  pub path: PathBuf,
  /// Name the object is stored under (`public/<name>`)
  pub name: String,
}

impl UploadFile {
  pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let name = path
      .file_name()
      .and_then(|n| n.to_str())
      .ok_or_else(|| eyre!("Not a file path: {}", path.display()))?
      .to_string();
    Ok(Self { path, name })
  }
}

fn is_png(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Turn whitespace-separated paths into a selection.
///
/// A directory expands to its `*.png` entries in name order. A file given
/// directly must itself be a PNG.
pub fn collect_selection(input: &str) -> Result<Vec<UploadFile>> {
  let mut files = Vec::new();

  for raw in input.split_whitespace() {
    let path = PathBuf::from(raw);

    if path.is_dir() {
      let entries = std::fs::read_dir(&path)
        .map_err(|e| eyre!("Failed to read directory {}: {}", path.display(), e))?;

      let mut pngs = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_png(p))
        .collect::<Vec<_>>();
      pngs.sort();

      for png in pngs {
        files.push(UploadFile::from_path(png)?);
      }
    } else if is_png(&path) {
      files.push(UploadFile::from_path(path)?);
    } else {
      return Err(eyre!("Not a PNG file: {}", path.display()));
    }
  }

  Ok(files)
}

/// Upload `files` in order to `public/<name>` in the workspace bucket.
///
/// The first failure stops the batch and is returned as the error.
pub async fn upload_png_files(
  ws: &Workspace,
  files: Vec<UploadFile>,
) -> Result<Vec<StoredObject>> {
  let remote = ws.remote();
  let bucket = ws.bucket();

  let stored = stream::iter(files)
    .then(|file| {
      let remote = remote.clone();
      async move {
        let bytes = tokio::fs::read(&file.path)
          .await
          .map_err(|e| eyre!("Failed to read {}: {}", file.path.display(), e))?;

        let object_path = format!("public/{}", file.name);
        tracing::debug!(bucket, path = %object_path, size = bytes.len(), "uploading");
        remote
          .upload(bucket, &object_path, bytes, CONTENT_TYPE)
          .await
      }
    })
    .try_collect::<Vec<_>>()
    .await?;

  tracing::info!(count = stored.len(), bucket, "files uploaded");
  Ok(stored)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MemoryStore;
  use std::sync::Arc;
  use std::time::Duration;

  fn workspace(store: Arc<MemoryStore>) -> Workspace {
    Workspace::with_remote(store, Duration::from_secs(300))
  }

  fn write_files(dir: &Path, names: &[&str]) {
    for name in names {
      std::fs::write(dir.join(name), b"\x89PNG").unwrap();
    }
  }

  #[test]
  fn test_directory_expands_to_sorted_pngs() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["b.png", "a.PNG", "notes.txt"]);

    let files = collect_selection(dir.path().to_str().unwrap()).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.PNG", "b.png"]);
  }

  #[test]
  fn test_named_file_must_be_png() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["logo.png", "notes.txt"]);
    let logo = dir.path().join("logo.png");
    let notes = dir.path().join("notes.txt");

    let files = collect_selection(logo.to_str().unwrap()).unwrap();
    assert_eq!(files[0].name, "logo.png");

    let input = format!("{} {}", logo.display(), notes.display());
    let err = collect_selection(&input).unwrap_err();
    assert!(err.to_string().starts_with("Not a PNG file"));
  }

  #[test]
  fn test_empty_input_is_empty_selection() {
    assert!(collect_selection("   ").unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_uploads_in_order_to_public() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["one.png", "two.png"]);
    let store = Arc::new(MemoryStore::new());
    let ws = workspace(store.clone());

    let files = collect_selection(dir.path().to_str().unwrap()).unwrap();
    let stored = upload_png_files(&ws, files).await.unwrap();

    assert_eq!(
      stored.iter().map(|s| s.key.as_str()).collect::<Vec<_>>(),
      vec!["files_bucket/public/one.png", "files_bucket/public/two.png"]
    );
    let uploads = store.uploads();
    assert_eq!(uploads[0].content_type, "image/png");
    assert_eq!(uploads[0].size, 4);
  }

  #[tokio::test]
  async fn test_nothing_to_upload() {
    let store = Arc::new(MemoryStore::new());
    let stored = upload_png_files(&workspace(store.clone()), Vec::new())
      .await
      .unwrap();
    assert!(stored.is_empty());
    assert!(store.uploads().is_empty());
  }

  #[tokio::test]
  async fn test_first_failure_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.png", "b.png", "c.png"]);
    let store = Arc::new(MemoryStore::new());
    store.fail_uploads("b.png", "The resource already exists");

    let files = collect_selection(dir.path().to_str().unwrap()).unwrap();
    let err = upload_png_files(&workspace(store.clone()), files)
      .await
      .unwrap_err();

    assert_eq!(err.to_string(), "The resource already exists");
    assert_eq!(store.uploads().len(), 1);
  }

  #[tokio::test]
  async fn test_missing_file_is_an_error() {
    let store = Arc::new(MemoryStore::new());
    let files = vec![UploadFile::from_path("/definitely/not/here.png").unwrap()];
    let err = upload_png_files(&workspace(store), files)
      .await
      .unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
  }
}
