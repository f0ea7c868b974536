//! Stale-document purging and the walk watermark it relies on.
//!
//! After a successful walk every current document has been touched by the
//! service. The purge removes everything older than a cutoff that lies at
//! least the safety margin before the walk started, so clock skew between
//! client and service cannot push a freshly touched document past it.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::remote::RemoteStore;

/// Wire format of the purge cutoff (UTC, second precision).
pub const CUTOFF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Start and end instants of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Watermark {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn elapsed(&self) -> Duration {
        self.end - self.start
    }

    /// `end - elapsed - margin`. The margin must be positive.
    pub fn cutoff(&self, margin: Duration) -> Result<DateTime<Utc>> {
        if margin <= Duration::zero() {
            bail!("purge margin must be positive, got {}s", margin.num_seconds());
        }
        self.elapsed()
            .checked_add(&margin)
            .and_then(|back| self.end.checked_sub_signed(back))
            .context("purge cutoff is out of range")
    }
}

pub fn format_cutoff(cutoff: DateTime<Utc>) -> String {
    cutoff.format(CUTOFF_FORMAT).to_string()
}

/// Ask the service to drop documents not touched since `cutoff`.
pub fn purge_stale<S: RemoteStore + ?Sized>(store: &S, cutoff: DateTime<Utc>) -> Result<()> {
    info!(cutoff = %format_cutoff(cutoff), "purging stale documents");
    store
        .purge(cutoff)
        .context("There was a fatal issue purging the datastore")
}
