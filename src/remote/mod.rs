//! Access to the hosted backend: table rows and object storage.

mod api_types;
mod client;
mod store;
pub mod types;

pub use api_types::decode_rows;
pub use client::RestClient;
pub use store::{Filter, RemoteStore, SelectQuery, StoredObject};
