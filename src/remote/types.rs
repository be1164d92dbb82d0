//! Row shapes for the workspace tables.
//!
//! Read types mirror a full `select=*` row. The `New*` types are what a client
//! sends on insert: keys and timestamps the backend fills in are optional and
//! left out of the request body when absent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
  pub id: i64,
  pub group_id: Option<String>,
  pub group_name: String,
  pub description: Option<String>,
  pub created_at: Option<String>,
  pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
  pub group_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub task_id: String,
  pub user_id: String,
  pub title: String,
  pub description: Option<String>,
  pub category_id: Option<String>,
  pub priority: Option<String>,
  pub status: Option<String>,
  pub due_date: Option<String>,
  pub created_at: Option<String>,
  pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
  pub title: String,
  pub user_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub due_date: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id: String,
  pub user_id: String,
  pub bio: Option<String>,
  pub avatar_url: Option<String>,
  pub created_at: Option<String>,
  pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
  pub user_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile_id: Option<String>,
}

/// Join row between `tasks` and `tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTag {
  pub task_id: String,
  pub tag_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaskTag {
  pub task_id: String,
  pub tag_id: String,
}

/// Metadata row for an uploaded file (the `files` table, not the bytes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
  pub id: i64,
  pub file_id: Option<String>,
  pub uploader_id: String,
  pub file_name: String,
  pub file_type: Option<String>,
  pub file_size: Option<i64>,
  pub upload_date: Option<String>,
  pub version: Option<i32>,
  pub is_active: Option<bool>,
  pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFileRecord {
  pub file_name: String,
  pub uploader_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_size: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<i32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub group_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: String,
  pub task_id: String,
  pub user_id: String,
  pub content: String,
  pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
  pub task_id: String,
  pub user_id: String,
  pub content: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTag {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub user_id: Option<String>,
  pub username: String,
  pub group_id: Option<String>,
  pub created_at: Option<String>,
  pub updated_at: Option<String>,
  pub email: String,
  pub password_hash: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub password_hash: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub group_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub session_id: String,
  pub user_id: String,
  pub token: String,
  pub created_at: Option<String>,
  pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
  pub user_id: String,
  pub token: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub category_id: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category_id: Option<String>,
}
