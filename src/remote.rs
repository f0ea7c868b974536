//! The document-store seam between the synchronizer and the service.
//!
//! [`RemoteStore`] names the five calls a folder sync makes. [`Session`]
//! implements it over HTTP; tests implement it in memory to observe exactly
//! which calls a walk produces.
//!
//! # Endpoints
//!
//! | Call | Method | Path | Accepted |
//! |------|--------|------|----------|
//! | `create_folder` | `POST` | `/customers/{id}/folders` | 200, 409 |
//! | `request_upload` | `POST` | `/customers/{id}/generatePresignedUrl` | 200, 409 |
//! | `transfer` | `PUT` | presigned URL | 200 |
//! | `validate_document` | `PUT` | `/customers/{id}/documents/{doc}/validate` | 204 |
//! | `purge` | `POST` | `/customers/{id}/datastore/purge` | 204 |

use anyhow::Result;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::json;
use tracing::warn;

use crate::client::{decode_json, expect_status, status_error};
use crate::error::{ApiError, Outcome};
use crate::models::{FolderRecord, PresignedResponse, RemoteId, UploadRequest, UploadTarget};
use crate::purge::format_cutoff;
use crate::session::Session;

/// Remote operations needed to mirror a local tree.
pub trait RemoteStore {
    /// Register a folder under `parent` (`None` is the customer's root).
    ///
    /// A conflict carries the existing folder's id when the service sent one.
    fn create_folder(&self, parent: Option<&RemoteId>, name: &str) -> Result<Outcome<RemoteId>>;

    /// Ask for a write target for one file. A conflict means a document with
    /// the same signature already exists and nothing needs to be sent.
    fn request_upload(&self, request: &UploadRequest) -> Result<Outcome<UploadTarget>>;

    /// Send the file's bytes to the write target.
    fn transfer(&self, target: &UploadTarget, bytes: Vec<u8>, mime: &str, filename: &str)
        -> Result<()>;

    /// Confirm that the bytes of `document_id` are in place.
    fn validate_document(&self, document_id: &RemoteId) -> Result<()>;

    /// Delete every document not touched since `cutoff`.
    fn purge(&self, cutoff: DateTime<Utc>) -> Result<()>;
}

impl RemoteStore for Session {
    fn create_folder(&self, parent: Option<&RemoteId>, name: &str) -> Result<Outcome<RemoteId>> {
        let body = json!({ "owner": parent, "name": name });
        let response = self.client.post_json(&self.customer_path("/folders"), &body)?;

        match response.status() {
            StatusCode::OK => {
                let folder: FolderRecord = decode_json(response)?;
                Ok(Outcome::Success(folder.id))
            }
            StatusCode::CONFLICT => {
                let existing = match decode_json::<FolderRecord>(response) {
                    Ok(folder) => Some(folder.id),
                    Err(e) => {
                        warn!(folder = name, error = %e, "conflict response carried no folder record");
                        None
                    }
                };
                Ok(Outcome::Conflict(existing))
            }
            _ => Err(status_error(response, "POST").into()),
        }
    }

    fn request_upload(&self, request: &UploadRequest) -> Result<Outcome<UploadTarget>> {
        let response = self
            .client
            .post_json(&self.customer_path("/generatePresignedUrl"), request)?;

        match response.status() {
            StatusCode::OK => {
                let url = response.url().to_string();
                let presigned: PresignedResponse = decode_json(response)?;
                let target = UploadTarget {
                    url: decode_locator(&presigned.upload_url, &url)?,
                    document_id: presigned.document_id,
                };
                Ok(Outcome::Success(target))
            }
            StatusCode::CONFLICT => Ok(Outcome::Conflict(None)),
            _ => Err(status_error(response, "POST").into()),
        }
    }

    fn transfer(
        &self,
        target: &UploadTarget,
        bytes: Vec<u8>,
        mime: &str,
        filename: &str,
    ) -> Result<()> {
        let response = self.client.put_bytes(&target.url, bytes, mime, filename)?;
        expect_status(response, "PUT", StatusCode::OK)?;
        Ok(())
    }

    fn validate_document(&self, document_id: &RemoteId) -> Result<()> {
        let path = self.customer_path(&format!("/documents/{}/validate", document_id));
        let response = self.client.put_empty(&path)?;
        expect_status(response, "PUT", StatusCode::NO_CONTENT)?;
        Ok(())
    }

    fn purge(&self, cutoff: DateTime<Utc>) -> Result<()> {
        let body = json!({ "timestamp": format_cutoff(cutoff) });
        let response = self
            .client
            .post_json(&self.customer_path("/datastore/purge"), &body)?;
        expect_status(response, "POST", StatusCode::NO_CONTENT)?;
        Ok(())
    }
}

/// Decode the base64 write-target locator into a URL string.
pub fn decode_locator(encoded: &str, source_url: &str) -> Result<String, ApiError> {
    let protocol = |reason: String| ApiError::Protocol {
        url: source_url.to_string(),
        reason,
    };
    let raw = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| protocol(format!("uploadUrl is not base64: {}", e)))?;
    String::from_utf8(raw).map_err(|e| protocol(format!("uploadUrl is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_round_trips_presigned_url() {
        let url = "https://bucket.s3.amazonaws.com/acme/a.txt?X-Amz-Signature=abc";
        let encoded = base64::engine::general_purpose::STANDARD.encode(url);
        assert_eq!(decode_locator(&encoded, "http://svc").unwrap(), url);
    }

    #[test]
    fn bad_locator_is_protocol_error() {
        let err = decode_locator("***not base64***", "http://svc/x").unwrap_err();
        assert!(matches!(err, ApiError::Protocol { .. }));
    }
}
