//! Wire shapes returned by the backend that never leave the remote module.

use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Error body shared by the table API and the storage API.
///
/// The table API sends `message`, `code`, `details` and `hint`; storage sends
/// `statusCode`, `error` and `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
  pub message: Option<String>,
  pub error: Option<String>,
  pub hint: Option<String>,
}

impl ApiError {
  fn into_message(self) -> Option<String> {
    let message = self.message.or(self.error)?;
    Some(match self.hint {
      Some(hint) if !hint.is_empty() => format!("{} ({})", message, hint),
      _ => message,
    })
  }
}

/// Response of a storage object upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStoredObject {
  #[serde(rename = "Key")]
  pub key: String,
}

/// Turn a non-2xx response body into the message surfaced to the user.
///
/// Falls back to the raw body, then to the bare status code.
pub fn error_message(status: u16, body: &str) -> String {
  if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
    if let Some(message) = api_error.into_message() {
      return message;
    }
  }

  let body = body.trim();
  if body.is_empty() {
    format!("HTTP {}", status)
  } else {
    body.to_string()
  }
}

/// Decode untyped rows into the table's record type.
pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Vec<T>> {
  rows
    .into_iter()
    .map(serde_json::from_value::<T>)
    .collect::<Result<Vec<T>, _>>()
    .map_err(|e| eyre!("Failed to parse {} row: {}", table, e))
}
