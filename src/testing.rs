//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::remote::{Filter, RemoteStore, SelectQuery, StoredObject};
use crate::ui::view::View;

/// One recorded `upload` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
  pub bucket: String,
  pub path: String,
  pub size: usize,
  pub content_type: String,
}

#[derive(Debug, Default)]
struct State {
  tables: HashMap<String, Vec<Value>>,
  selects: HashMap<String, usize>,
  deletes: Vec<(String, Vec<Filter>)>,
  uploads: Vec<Upload>,
  failing_selects: HashMap<String, String>,
  failing_inserts: HashMap<String, String>,
  failing_deletes: HashMap<String, String>,
  failing_uploads: HashMap<String, String>,
  next_id: i64,
  no_key_defaults: bool,
}

/// In-memory backend: tables of JSON rows, equality filters, call counts and
/// per-table failures.
///
/// Projections are ignored; a select returns whole rows. Inserts fill in `id`
/// and the table's generated key column the way the real schema defaults do.
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

/// Uuid key column the backend generates on insert.
fn generated_key(table: &str) -> Option<&'static str> {
  match table {
    "tasks" => Some("task_id"),
    "profiles" => Some("profile_id"),
    "comments" => Some("comment_id"),
    "tags" => Some("tag_id"),
    "sessions" => Some("session_id"),
    "categories" => Some("category_id"),
    _ => None,
  }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
  filters.iter().all(|filter| match row.get(&filter.column) {
    Some(Value::String(s)) => *s == filter.value,
    Some(other) => other.to_string() == filter.value,
    None => false,
  })
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Behave like a schema without column defaults: inserts store the row as sent.
  pub fn without_key_defaults(self) -> Self {
    self.state.lock().unwrap().no_key_defaults = true;
    self
  }

  pub fn seed(&self, table: &str, rows: Vec<Value>) {
    let mut state = self.state.lock().unwrap();
    state
      .tables
      .entry(table.to_string())
      .or_default()
      .extend(rows);
  }

  pub fn rows(&self, table: &str) -> Vec<Value> {
    let state = self.state.lock().unwrap();
    state.tables.get(table).cloned().unwrap_or_default()
  }

  pub fn select_count(&self, table: &str) -> usize {
    let state = self.state.lock().unwrap();
    state.selects.get(table).copied().unwrap_or(0)
  }

  pub fn deletes(&self) -> Vec<(String, Vec<Filter>)> {
    self.state.lock().unwrap().deletes.clone()
  }

  pub fn uploads(&self) -> Vec<Upload> {
    self.state.lock().unwrap().uploads.clone()
  }

  pub fn fail_selects(&self, table: &str, message: &str) {
    let mut state = self.state.lock().unwrap();
    state
      .failing_selects
      .insert(table.to_string(), message.to_string());
  }

  pub fn fail_inserts(&self, table: &str, message: &str) {
    let mut state = self.state.lock().unwrap();
    state
      .failing_inserts
      .insert(table.to_string(), message.to_string());
  }

  pub fn fail_deletes(&self, table: &str, message: &str) {
    let mut state = self.state.lock().unwrap();
    state
      .failing_deletes
      .insert(table.to_string(), message.to_string());
  }

  /// Fail uploads whose path ends with `suffix`.
  pub fn fail_uploads(&self, suffix: &str, message: &str) {
    let mut state = self.state.lock().unwrap();
    state
      .failing_uploads
      .insert(suffix.to_string(), message.to_string());
  }
}

#[async_trait]
impl RemoteStore for MemoryStore {
  async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>> {
    let mut state = self.state.lock().unwrap();
    *state.selects.entry(table.to_string()).or_default() += 1;

    if let Some(message) = state.failing_selects.get(table) {
      return Err(eyre!("{}", message));
    }

    Ok(
      state
        .tables
        .get(table)
        .map(|rows| {
          rows
            .iter()
            .filter(|row| matches(row, &query.filters))
            .cloned()
            .collect()
        })
        .unwrap_or_default(),
    )
  }

  async fn insert(&self, table: &str, mut row: Value) -> Result<Vec<Value>> {
    let mut state = self.state.lock().unwrap();

    if let Some(message) = state.failing_inserts.get(table) {
      return Err(eyre!("{}", message));
    }

    state.next_id += 1;
    let id = state.next_id;
    match &mut row {
      Value::Object(fields) if !state.no_key_defaults => {
        fields.entry("id").or_insert(Value::from(id));
        if let Some(column) = generated_key(table) {
          fields
            .entry(column)
            .or_insert(Value::from(format!("{}-{}", column, id)));
        }
      }
      _ => {}
    }

    state
      .tables
      .entry(table.to_string())
      .or_default()
      .push(row.clone());
    Ok(vec![row])
  }

  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
    let mut state = self.state.lock().unwrap();
    state.deletes.push((table.to_string(), filters.to_vec()));

    if let Some(message) = state.failing_deletes.get(table) {
      return Err(eyre!("{}", message));
    }

    if let Some(rows) = state.tables.get_mut(table) {
      rows.retain(|row| !matches(row, filters));
    }
    Ok(())
  }

  async fn upload(
    &self,
    bucket: &str,
    path: &str,
    bytes: Vec<u8>,
    content_type: &str,
  ) -> Result<StoredObject> {
    let mut state = self.state.lock().unwrap();

    let failure = state
      .failing_uploads
      .iter()
      .find(|(suffix, _)| path.ends_with(suffix.as_str()))
      .map(|(_, message)| message.clone());
    if let Some(message) = failure {
      return Err(eyre!("{}", message));
    }

    state.uploads.push(Upload {
      bucket: bucket.to_string(),
      path: path.to_string(),
      size: bytes.len(),
      content_type: content_type.to_string(),
    });
    Ok(StoredObject {
      key: format!("{}/{}", bucket, path),
    })
  }
}

/// Render a view into an in-memory terminal and return its text, one line per row.
pub fn render_to_string(view: &mut dyn View, width: u16, height: u16) -> String {
  let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
  terminal
    .draw(|frame| view.render(frame, frame.area()))
    .unwrap();

  let buffer = terminal.backend().buffer();
  let width = buffer.area.width as usize;
  buffer
    .content()
    .chunks(width)
    .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
    .collect::<Vec<_>>()
    .join("\n")
}

/// Tick a view until its spawned work has had time to report back.
pub async fn settle(view: &mut dyn View) {
  for _ in 0..20 {
    tokio::time::sleep(Duration::from_millis(5)).await;
    view.tick();
  }
}
