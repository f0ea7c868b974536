//! # Lunai
//!
//! Command-line client for the Lunai ingestion service.
//!
//! The client authenticates a configured customer, mirrors a local document
//! folder into the service's datastore, asks the service to crawl websites,
//! triggers server-side vectorization, queries the vector store, and manages
//! projects with server-driven idea generation. All heavy lifting happens
//! remotely; this crate shapes requests and keeps the remote tree in sync.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Local folder │──▶│ Walker       │──▶│ RemoteStore  │
//! │  (docstore)  │   │ Upload+Purge │   │ (HTTP/JSON)  │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!                          ┌───────────────────┤
//!                          ▼                   ▼
//!                    ┌───────────┐      ┌────────────┐
//!                    │ Presigned │      │  Lunai API │
//!                    │  storage  │      │  service   │
//!                    └───────────┘      └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! echo '{"name": "acme"}' > config.json
//! lunai get-customer
//! lunai ingest ./docstore
//! lunai vec-dstore
//! lunai query "deployment checklist" --k 5
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | JSON configuration file |
//! | [`client`] | Blocking HTTP transport |
//! | [`session`] | Customer resolution |
//! | [`remote`] | Document-store seam used by the sync |
//! | [`walker`] | Local tree → remote folders |
//! | [`upload`] | Single-file upload |
//! | [`purge`] | Walk watermark and stale-document purge |
//! | [`ingest`] | Folder sync orchestration, document vectorization |
//! | [`websites`] | Website ingestion and vectorization |
//! | [`vectorstore`] | Vector store queries |
//! | [`project`] | Projects and idea generation |

pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod mime;
pub mod models;
pub mod progress;
pub mod project;
pub mod purge;
pub mod remote;
pub mod session;
pub mod signature;
pub mod upload;
pub mod vectorstore;
pub mod walker;
pub mod websites;

#[cfg(test)]
mod fake_store;
