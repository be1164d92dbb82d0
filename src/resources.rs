//! Table registry for the generic list/add pair.
//!
//! Every workspace table is one `Resource` impl. `register_resources!` turns the
//! list of record types into the `RESOURCES` table (driving commands) and
//! `dispatch` (turning a table name back into its record type).

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::remote::types::{
  Category, Comment, FileRecord, Group, NewCategory, NewComment, NewFileRecord, NewGroup,
  NewProfile, NewSession, NewTag, NewTask, NewTaskTag, NewUser, Profile, Session, Tag, Task,
  TaskTag, User,
};

/// Static description of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
  /// Table name; also the cache key of the collection
  pub table: &'static str,
  pub label: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// How a form input is turned into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Integer,
  Boolean,
}

/// One column a client may send on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name: &'static str,
  pub kind: FieldKind,
  pub required: bool,
}

impl FieldSpec {
  pub const fn text(name: &'static str) -> Self {
    Self {
      name,
      kind: FieldKind::Text,
      required: false,
    }
  }

  pub const fn integer(name: &'static str) -> Self {
    Self {
      name,
      kind: FieldKind::Integer,
      required: false,
    }
  }

  pub const fn boolean(name: &'static str) -> Self {
    Self {
      name,
      kind: FieldKind::Boolean,
      required: false,
    }
  }

  pub const fn required(mut self) -> Self {
    self.required = true;
    self
  }
}

/// A remote table exposed as a cached read plus an invalidating write.
pub trait Resource:
  Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
  const INFO: ResourceInfo;

  /// Insert columns, in form order.
  const FIELDS: &'static [FieldSpec];

  /// Shape sent on insert.
  type New: Serialize + DeserializeOwned + Send + Sync + 'static;

  /// Row identifier shown in lists.
  fn key(&self) -> String;

  fn title(&self) -> String;

  /// Short secondary value (status, email...) shown next to the title.
  fn badge(&self) -> Option<&str> {
    None
  }
}

/// Code that needs the concrete record type behind a table name.
pub trait ResourceVisitor {
  type Output;

  fn visit<R: Resource>(self) -> Self::Output;
}

macro_rules! register_resources {
  ($($ty:ty),+ $(,)?) => {
    /// Every table exposed through the generic list/add pair.
    pub const RESOURCES: &[ResourceInfo] = &[$(<$ty as Resource>::INFO),+];

    /// Run `visitor` with the record type registered for `table`.
    pub fn dispatch<V: ResourceVisitor>(table: &str, visitor: V) -> Option<V::Output> {
      $(
        if table == <$ty as Resource>::INFO.table {
          return Some(visitor.visit::<$ty>());
        }
      )+
      None
    }
  };
}

register_resources!(
  Group,
  Task,
  Profile,
  TaskTag,
  FileRecord,
  Comment,
  Tag,
  User,
  Session,
  Category,
);

/// Build a typed insert record from raw form inputs (one per `R::FIELDS` entry).
///
/// Blank inputs are left out so the backend applies its defaults; missing
/// required columns are reported by the typed conversion.
pub fn parse_new_record<R: Resource>(inputs: &[String]) -> Result<R::New> {
  let mut row = Map::new();

  for (field, raw) in R::FIELDS.iter().zip(inputs) {
    let raw = raw.trim();
    if raw.is_empty() {
      continue;
    }
    row.insert(field.name.to_string(), parse_field(field, raw)?);
  }

  serde_json::from_value(Value::Object(row))
    .map_err(|e| eyre!("Invalid {} record: {}", R::INFO.table, e))
}

fn parse_field(field: &FieldSpec, raw: &str) -> Result<Value> {
  match field.kind {
    FieldKind::Text => Ok(Value::String(raw.to_string())),
    FieldKind::Integer => raw
      .parse::<i64>()
      .map(Value::from)
      .map_err(|_| eyre!("{} must be a whole number", field.name)),
    FieldKind::Boolean => match raw.to_lowercase().as_str() {
      "true" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
      "false" | "no" | "n" | "0" => Ok(Value::Bool(false)),
      _ => Err(eyre!("{} must be true or false", field.name)),
    },
  }
}

impl Resource for Group {
  const INFO: ResourceInfo = ResourceInfo {
    table: "groups",
    label: "Groups",
    aliases: &["g", "group"],
    description: "Workspace groups",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("group_name").required(),
    FieldSpec::text("description"),
    FieldSpec::text("group_id"),
  ];
  type New = NewGroup;

  fn key(&self) -> String {
    self.id.to_string()
  }

  fn title(&self) -> String {
    self.group_name.clone()
  }
}

impl Resource for Task {
  const INFO: ResourceInfo = ResourceInfo {
    table: "tasks",
    label: "Tasks",
    aliases: &["t", "task"],
    description: "Tasks and their status",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("title").required(),
    FieldSpec::text("user_id").required(),
    FieldSpec::text("description"),
    FieldSpec::text("category_id"),
    FieldSpec::text("priority"),
    FieldSpec::text("status"),
    FieldSpec::text("due_date"),
    FieldSpec::text("task_id"),
  ];
  type New = NewTask;

  fn key(&self) -> String {
    self.task_id.clone()
  }

  fn title(&self) -> String {
    self.title.clone()
  }

  fn badge(&self) -> Option<&str> {
    self.status.as_deref()
  }
}

impl Resource for Profile {
  const INFO: ResourceInfo = ResourceInfo {
    table: "profiles",
    label: "Profiles",
    aliases: &["p", "profile"],
    description: "User profiles",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("user_id").required(),
    FieldSpec::text("bio"),
    FieldSpec::text("avatar_url"),
    FieldSpec::text("profile_id"),
  ];
  type New = NewProfile;

  fn key(&self) -> String {
    self.profile_id.clone()
  }

  fn title(&self) -> String {
    self.bio.clone().unwrap_or_else(|| self.user_id.clone())
  }
}

impl Resource for TaskTag {
  const INFO: ResourceInfo = ResourceInfo {
    table: "task_tags",
    label: "Task tags",
    aliases: &["tt", "tasktags"],
    description: "Tags attached to tasks",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("task_id").required(),
    FieldSpec::text("tag_id").required(),
  ];
  type New = NewTaskTag;

  fn key(&self) -> String {
    self.task_id.clone()
  }

  fn title(&self) -> String {
    format!("{} -> {}", self.task_id, self.tag_id)
  }
}

impl Resource for FileRecord {
  const INFO: ResourceInfo = ResourceInfo {
    table: "files",
    label: "Files",
    aliases: &["f", "file"],
    description: "File metadata records",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("file_name").required(),
    FieldSpec::text("uploader_id").required(),
    FieldSpec::text("file_type"),
    FieldSpec::integer("file_size"),
    FieldSpec::integer("version"),
    FieldSpec::boolean("is_active"),
    FieldSpec::text("group_id"),
    FieldSpec::text("file_id"),
  ];
  type New = NewFileRecord;

  fn key(&self) -> String {
    self.id.to_string()
  }

  fn title(&self) -> String {
    self.file_name.clone()
  }

  fn badge(&self) -> Option<&str> {
    self.file_type.as_deref()
  }
}

impl Resource for Comment {
  const INFO: ResourceInfo = ResourceInfo {
    table: "comments",
    label: "Comments",
    aliases: &["c", "comment"],
    description: "Task comments",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("task_id").required(),
    FieldSpec::text("user_id").required(),
    FieldSpec::text("content").required(),
    FieldSpec::text("comment_id"),
  ];
  type New = NewComment;

  fn key(&self) -> String {
    self.comment_id.clone()
  }

  fn title(&self) -> String {
    self.content.clone()
  }
}

impl Resource for Tag {
  const INFO: ResourceInfo = ResourceInfo {
    table: "tags",
    label: "Tags",
    aliases: &["tag"],
    description: "Tag names",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("name").required(),
    FieldSpec::text("tag_id"),
  ];
  type New = NewTag;

  fn key(&self) -> String {
    self.tag_id.clone()
  }

  fn title(&self) -> String {
    self.name.clone()
  }
}

impl Resource for User {
  const INFO: ResourceInfo = ResourceInfo {
    table: "users",
    label: "Users",
    aliases: &["u", "user"],
    description: "Workspace users",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("username").required(),
    FieldSpec::text("email").required(),
    FieldSpec::text("password_hash").required(),
    FieldSpec::text("first_name"),
    FieldSpec::text("last_name"),
    FieldSpec::text("group_id"),
    FieldSpec::text("user_id"),
  ];
  type New = NewUser;

  fn key(&self) -> String {
    self.id.to_string()
  }

  fn title(&self) -> String {
    self.username.clone()
  }

  fn badge(&self) -> Option<&str> {
    Some(&self.email)
  }
}

impl Resource for Session {
  const INFO: ResourceInfo = ResourceInfo {
    table: "sessions",
    label: "Sessions",
    aliases: &["s", "session"],
    description: "Login sessions",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("user_id").required(),
    FieldSpec::text("token").required(),
    FieldSpec::text("expires_at"),
    FieldSpec::text("session_id"),
  ];
  type New = NewSession;

  fn key(&self) -> String {
    self.session_id.clone()
  }

  fn title(&self) -> String {
    self.user_id.clone()
  }

  fn badge(&self) -> Option<&str> {
    self.expires_at.as_deref()
  }
}

impl Resource for Category {
  const INFO: ResourceInfo = ResourceInfo {
    table: "categories",
    label: "Categories",
    aliases: &["cat", "category"],
    description: "Task categories",
  };
  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::text("name").required(),
    FieldSpec::text("category_id"),
  ];
  type New = NewCategory;

  fn key(&self) -> String {
    self.category_id.clone()
  }

  fn title(&self) -> String {
    self.name.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct TableName;

  impl ResourceVisitor for TableName {
    type Output = &'static str;

    fn visit<R: Resource>(self) -> Self::Output {
      R::INFO.table
    }
  }

  fn inputs(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn test_registry_covers_every_table() {
    let tables: Vec<&str> = RESOURCES.iter().map(|info| info.table).collect();
    assert_eq!(
      tables,
      vec![
        "groups",
        "tasks",
        "profiles",
        "task_tags",
        "files",
        "comments",
        "tags",
        "users",
        "sessions",
        "categories"
      ]
    );

    for info in RESOURCES {
      assert_eq!(dispatch(info.table, TableName), Some(info.table));
    }
    assert_eq!(dispatch("favorites", TableName), None);
  }

  #[test]
  fn test_fields_match_insert_shape() {
    // Every declared field must be accepted by the typed insert record
    assert_eq!(Task::FIELDS.len(), 8);
    let task = parse_new_record::<Task>(&inputs(&[
      "Write report",
      "u1",
      "",
      "",
      "high",
      "todo",
      "",
      "",
    ]))
    .unwrap();
    assert_eq!(task.title, "Write report");
    assert_eq!(task.priority.as_deref(), Some("high"));
    assert!(task.description.is_none());
  }

  #[test]
  fn test_missing_required_field() {
    let err = parse_new_record::<Task>(&inputs(&["", "u1"])).unwrap_err();
    assert!(err.to_string().contains("title"));
  }

  #[test]
  fn test_typed_fields() {
    let file = parse_new_record::<FileRecord>(&inputs(&[
      "logo.png", "u1", "image/png", "2048", "1", "yes", "", "",
    ]))
    .unwrap();
    assert_eq!(file.file_size, Some(2048));
    assert_eq!(file.version, Some(1));
    assert_eq!(file.is_active, Some(true));

    let err = parse_new_record::<FileRecord>(&inputs(&["logo.png", "u1", "", "big"])).unwrap_err();
    assert_eq!(err.to_string(), "file_size must be a whole number");
  }

  #[test]
  fn test_blank_optional_fields_are_omitted() {
    let group = parse_new_record::<Group>(&inputs(&["Design", "  ", ""])).unwrap();
    let body = serde_json::to_value(&group).unwrap();
    assert_eq!(body, serde_json::json!({"group_name": "Design"}));
  }
}
