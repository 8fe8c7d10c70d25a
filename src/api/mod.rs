pub mod backend;
pub mod client;
pub mod error;
pub mod types;

pub use backend::{Assistant, AuthBackend, Backend, CredentialsBackend, FileStore};
pub use client::BackendClient;
pub use error::ApiError;
pub use types::{
    AuthGrant, ChatRequest, Credentials, EntryKind, FileEntry, Role, Turn,
};
