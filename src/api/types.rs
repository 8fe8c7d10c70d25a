//! Wire types shared with the backend.
//!
//! Field names follow the backend's JSON exactly (`webUrl`, `downloadUrl`,
//! `type`), so these structs double as the domain model for listings and
//! conversation turns.

use serde::{Deserialize, Serialize};

/// Whether a file-store entry can be navigated into or only selected.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    File,
    Folder,
}

/// One item of a folder listing. Identity is `id`; names may repeat.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(rename = "webUrl", default)]
    pub web_url: String,
    #[serde(
        rename = "downloadUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub download_ref: Option<String>,
}

impl FileEntry {
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, EntryKind::File)
    }

    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, EntryKind::Folder)
    }

    fn new(id: impl Into<String>, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            web_url: String::new(),
            download_ref: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// Author of a conversation turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One message in the conversation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /message`.
///
/// `history` is the conversation as it stood before `message` was typed;
/// the new message travels only in `message`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<Turn>,
    pub context_files: Vec<FileEntry>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Deserialize, Debug)]
pub struct ListingResponse {
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Deserialize, Debug)]
pub struct LoginUrlResponse {
    pub url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ExchangeRequest<'a> {
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

/// Result of a successful authorization-code exchange.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub username: String,
}

/// Error body the backend attaches to non-success responses.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// File-store app registration. Absent fields mean "not configured yet".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            tenant_id: Some(tenant_id.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        [&self.client_id, &self.client_secret, &self.tenant_id]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_deserializes_backend_shape() {
        let json = r#"{
            "name": "report.docx",
            "id": "01ABC",
            "webUrl": "https://contoso.sharepoint.com/report.docx",
            "downloadUrl": "https://download/01ABC",
            "type": "file"
        }"#;
        let entry: FileEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "01ABC");
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.download_ref.as_deref(), Some("https://download/01ABC"));
    }

    #[test]
    fn test_folder_without_download_url() {
        let json = r#"{"name":"Docs","id":"F1","webUrl":"https://x/Docs","downloadUrl":null,"type":"folder"}"#;
        let entry: FileEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_folder());
        assert_eq!(entry.download_ref, None);
    }

    #[test]
    fn test_missing_type_defaults_to_file() {
        let json = r#"{"name":"a.txt","id":"1","webUrl":"u"}"#;
        let entry: FileEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::File);
    }

    /// Contract test: the `/message` body must match what the backend reads.
    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest {
            message: "and now?".to_string(),
            history: vec![Turn::user("hi"), Turn::assistant("hello")],
            context_files: vec![FileEntry::file("1", "a.txt")],
        };
        let serialized = serde_json::to_string(&req).unwrap();
        let expected = r#"{"message":"and now?","history":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}],"context_files":[{"id":"1","name":"a.txt","type":"file","webUrl":""}]}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_credentials_partial_is_not_configured() {
        let creds: Credentials = serde_json::from_str(r#"{"client_id":"abc"}"#).unwrap();
        assert!(!creds.is_configured());
        assert!(Credentials::new("a", "b", "c").is_configured());
    }

    #[test]
    fn test_credentials_empty_strings_are_not_configured() {
        let creds = Credentials::new("a", "", "c");
        assert!(!creds.is_configured());
    }
}
