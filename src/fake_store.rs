//! In-memory [`RemoteStore`] that records every call, for unit tests.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::error::Outcome;
use crate::models::{RemoteId, UploadRequest, UploadTarget};
use crate::remote::RemoteStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateFolder {
        parent: Option<RemoteId>,
        name: String,
    },
    RequestUpload(UploadRequest),
    Transfer {
        document_id: RemoteId,
        filename: String,
        mime: String,
        bytes: usize,
    },
    Validate(RemoteId),
    Purge(DateTime<Utc>),
}

#[derive(Default)]
pub struct FakeStore {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    stored_signatures: RefCell<HashSet<String>>,
    existing_folders: HashSet<String>,
    anonymous_folders: HashSet<String>,
    failing_folders: HashSet<String>,
    failing_uploads: HashSet<String>,
    failing_transfers: HashSet<String>,
    fail_purge: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folders with this name answer 409 with their existing id.
    pub fn existing_folder(mut self, name: &str) -> Self {
        self.existing_folders.insert(name.to_string());
        self
    }

    /// Folders with this name answer 409 without saying which folder exists.
    pub fn existing_folder_without_id(mut self, name: &str) -> Self {
        self.anonymous_folders.insert(name.to_string());
        self
    }

    /// Registering a folder with this name fails.
    pub fn fail_folder(mut self, name: &str) -> Self {
        self.failing_folders.insert(name.to_string());
        self
    }

    /// Requesting a write target for this file name fails.
    pub fn fail_upload_of(mut self, filename: &str) -> Self {
        self.failing_uploads.insert(filename.to_string());
        self
    }

    pub fn fail_transfer_of(mut self, filename: &str) -> Self {
        self.failing_transfers.insert(filename.to_string());
        self
    }

    pub fn fail_purge(mut self) -> Self {
        self.fail_purge = true;
        self
    }

    /// Pretend content with this signature is already stored.
    pub fn with_stored_signature(self, signature: &str) -> Self {
        self.stored_signatures
            .borrow_mut()
            .insert(signature.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn transfer_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Transfer { .. }))
    }

    pub fn validate_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Validate(_)))
    }

    pub fn purge_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Purge(_)))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn fresh_id(&self, prefix: &str) -> RemoteId {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        RemoteId::new(format!("{}-{}", prefix, n))
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl RemoteStore for FakeStore {
    fn create_folder(&self, parent: Option<&RemoteId>, name: &str) -> Result<Outcome<RemoteId>> {
        self.record(Call::CreateFolder {
            parent: parent.cloned(),
            name: name.to_string(),
        });
        if self.failing_folders.contains(name) {
            bail!("POST /folders returned 500 Internal Server Error");
        }
        if self.anonymous_folders.contains(name) {
            return Ok(Outcome::Conflict(None));
        }
        if self.existing_folders.contains(name) {
            return Ok(Outcome::Conflict(Some(RemoteId::new(format!(
                "existing-{}",
                name
            )))));
        }
        Ok(Outcome::Success(self.fresh_id("folder")))
    }

    fn request_upload(&self, request: &UploadRequest) -> Result<Outcome<UploadTarget>> {
        self.record(Call::RequestUpload(request.clone()));
        if self.failing_uploads.contains(&request.filename) {
            bail!("POST /generatePresignedUrl returned 500 Internal Server Error");
        }
        if self.stored_signatures.borrow().contains(&request.signature) {
            return Ok(Outcome::Conflict(None));
        }
        let document_id = self.fresh_id("doc");
        Ok(Outcome::Success(UploadTarget {
            url: format!("https://objects.test/{}", document_id),
            document_id,
        }))
    }

    fn transfer(
        &self,
        target: &UploadTarget,
        bytes: Vec<u8>,
        mime: &str,
        filename: &str,
    ) -> Result<()> {
        self.record(Call::Transfer {
            document_id: target.document_id.clone(),
            filename: filename.to_string(),
            mime: mime.to_string(),
            bytes: bytes.len(),
        });
        if self.failing_transfers.contains(filename) {
            bail!("PUT upload returned 403 Forbidden");
        }
        self.stored_signatures
            .borrow_mut()
            .insert(crate::signature::signature(&bytes));
        Ok(())
    }

    fn validate_document(&self, document_id: &RemoteId) -> Result<()> {
        self.record(Call::Validate(document_id.clone()));
        Ok(())
    }

    fn purge(&self, cutoff: DateTime<Utc>) -> Result<()> {
        self.record(Call::Purge(cutoff));
        if self.fail_purge {
            bail!("POST /datastore/purge returned 500 Internal Server Error");
        }
        Ok(())
    }
}
