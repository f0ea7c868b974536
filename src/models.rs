//! Wire types exchanged with the remote service.
//!
//! Field names follow the service's camelCase JSON. Timestamps are kept as
//! RFC 3339 `DateTime<Utc>` values and re-emitted in the same form.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque identifier handed out by the remote service.
///
/// Older deployments used integer keys, newer ones UUID strings; both decode
/// into the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RemoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) if !s.is_empty() => Ok(RemoteId(s)),
            serde_json::Value::Number(n) => Ok(RemoteId(n.to_string())),
            other => Err(de::Error::custom(format!(
                "expected a non-empty string or number id, got {}",
                other
            ))),
        }
    }
}

/// The customer the configured name resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub datastore: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Folder record returned by `POST /customers/{id}/folders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: RemoteId,
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `POST /customers/{id}/generatePresignedUrl`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub parent_id: Option<RemoteId>,
    pub filename: String,
    pub mime: String,
    pub signature: String,
    pub size: u64,
}

/// Raw response of `generatePresignedUrl`; `upload_url` is base64.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedResponse {
    pub upload_url: String,
    pub document_id: RemoteId,
}

/// A decoded write target for one document's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub url: String,
    pub document_id: RemoteId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: RemoteId,
    pub customer_id: RemoteId,
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub idea_generation_model_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdea {
    #[serde(default)]
    pub id: Option<RemoteId>,
    pub title: String,
    #[serde(default)]
    pub used: bool,
}

/// Body of `POST /projects/{id}/generateIdeas`.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdeasRequest {
    pub k: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeasResponse {
    pub ideas: Vec<ProjectIdea>,
    pub conversation_id: String,
}

/// Body of `POST /customers/{id}/websites`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SiteRequest {
    pub domain: String,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub insert: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitePage {
    pub url: String,
}

/// Response of `POST /customers/{id}/websites`. The site record is kept
/// verbatim for printing.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteResponse {
    pub site: serde_json::Value,
    #[serde(default)]
    pub pages: Vec<SitePage>,
}

/// Body of `PUT /customers/{id}/vectorstore/query`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub k: u32,
    pub include_content: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remote_id_accepts_numbers_and_strings() {
        let a: RemoteId = serde_json::from_value(json!(42)).unwrap();
        let b: RemoteId = serde_json::from_value(json!("9b1c")).unwrap();
        assert_eq!(a.as_str(), "42");
        assert_eq!(b.as_str(), "9b1c");
        assert!(serde_json::from_value::<RemoteId>(json!("")).is_err());
        assert!(serde_json::from_value::<RemoteId>(json!(null)).is_err());
    }

    #[test]
    fn upload_request_uses_service_field_names() {
        let req = UploadRequest {
            parent_id: None,
            filename: "a.txt".to_string(),
            mime: "text/plain".to_string(),
            signature: "abc".to_string(),
            size: 3,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["parentId"], serde_json::Value::Null);
        assert_eq!(v["filename"], "a.txt");
        assert_eq!(v["size"], 3);
    }

    #[test]
    fn ideas_request_omits_unset_feedback() {
        let first = serde_json::to_value(IdeasRequest {
            k: 3,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(first, json!({"k": 3}));

        let second = serde_json::to_value(IdeasRequest {
            k: 3,
            feedback: Some("shorter".to_string()),
            conversation_id: Some("c1".to_string()),
        })
        .unwrap();
        assert_eq!(second["conversationId"], "c1");
        assert_eq!(second["feedback"], "shorter");
    }

    #[test]
    fn customer_decodes_service_timestamps() {
        let c: Customer = serde_json::from_value(json!({
            "id": "c-1",
            "name": "acme",
            "datastore": "acme-store",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00.123456Z"
        }))
        .unwrap();
        assert_eq!(c.id.as_str(), "c-1");
        assert_eq!(c.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }
}
