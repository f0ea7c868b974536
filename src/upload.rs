//! Single-file upload: signature, write target, byte transfer, validation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::error::Outcome;
use crate::mime::guess_mime;
use crate::models::{RemoteId, UploadRequest};
use crate::remote::RemoteStore;
use crate::signature::signature;

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// Bytes were sent and the document validated.
    Uploaded { bytes: u64 },
    /// The service already had identical content; nothing was sent.
    Unchanged,
}

/// Upload the file at `path` as a document under `parent`.
///
/// The whole file is read into memory first. A conflict on the write-target
/// request means the content is already stored and counts as success.
pub fn upload_file<S: RemoteStore + ?Sized>(
    store: &S,
    parent: Option<&RemoteId>,
    path: &Path,
) -> Result<UploadStatus> {
    let contents = std::fs::read(path)
        .with_context(|| format!("Error opening or reading the file: {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("path has no file name: {}", path.display()))?;
    let mime = guess_mime(path);
    let size = contents.len() as u64;

    let request = UploadRequest {
        parent_id: parent.cloned(),
        filename: filename.clone(),
        mime: mime.to_string(),
        signature: signature(&contents),
        size,
    };

    let target = match store
        .request_upload(&request)
        .with_context(|| format!("failed to generate upload target for {}", path.display()))?
    {
        Outcome::Success(target) => target,
        Outcome::Conflict(_) => {
            warn!(file = %path.display(), "file already exists remotely");
            return Ok(UploadStatus::Unchanged);
        }
    };

    info!(file = %path.display(), document = %target.document_id, size, "uploading file");

    store
        .transfer(&target, contents, mime, &filename)
        .with_context(|| format!("failed to transfer {}", path.display()))?;
    store
        .validate_document(&target.document_id)
        .with_context(|| format!("failed to validate upload of {}", path.display()))?;

    Ok(UploadStatus::Uploaded { bytes: size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_store::{Call, FakeStore};
    use tempfile::TempDir;

    #[test]
    fn uploads_then_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let store = FakeStore::new();
        let parent = RemoteId::new("f-1");
        let status = upload_file(&store, Some(&parent), &path).unwrap();
        assert_eq!(status, UploadStatus::Uploaded { bytes: 5 });

        let calls = store.calls();
        assert_eq!(calls.len(), 3);
        match &calls[0] {
            Call::RequestUpload(req) => {
                assert_eq!(req.parent_id, Some(parent.clone()));
                assert_eq!(req.filename, "a.txt");
                assert_eq!(req.mime, "text/plain");
                assert_eq!(req.signature, signature(b"hello"));
                assert_eq!(req.size, 5);
            }
            other => panic!("unexpected call {:?}", other),
        }
        match &calls[1] {
            Call::Transfer {
                document_id,
                filename,
                mime,
                bytes,
            } => {
                assert_eq!(document_id.as_str(), "doc-1");
                assert_eq!(filename, "a.txt");
                assert_eq!(mime, "text/plain");
                assert_eq!(*bytes, 5);
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert!(matches!(&calls[2], Call::Validate(_)));
    }

    #[test]
    fn identical_content_is_sent_once() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("one.md");
        let second = tmp.path().join("two.md");
        std::fs::write(&first, "same bytes").unwrap();
        std::fs::write(&second, "same bytes").unwrap();

        let store = FakeStore::new();
        assert!(matches!(
            upload_file(&store, None, &first).unwrap(),
            UploadStatus::Uploaded { .. }
        ));
        assert_eq!(
            upload_file(&store, None, &second).unwrap(),
            UploadStatus::Unchanged
        );
        assert_eq!(store.transfer_count(), 1);
        assert_eq!(store.validate_count(), 1);
    }

    #[test]
    fn unreadable_file_fails_without_remote_calls() {
        let tmp = TempDir::new().unwrap();
        let store = FakeStore::new();
        let err = upload_file(&store, None, &tmp.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn failed_transfer_skips_validation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("b.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let store = FakeStore::new().fail_transfer_of("b.png");
        assert!(upload_file(&store, None, &path).is_err());
        assert_eq!(store.validate_count(), 0);
    }
}
