//! Vector store queries.

use anyhow::{Context, Result};
use reqwest::StatusCode;

use crate::client::{decode_json, expect_status};
use crate::config::Config;
use crate::models::QueryRequest;
use crate::session::Session;

/// Ranked document and website-page matches, returned as the service sends them.
pub fn query(session: &Session, request: &QueryRequest) -> Result<serde_json::Value> {
    let response = session
        .client
        .put_json(&session.customer_path("/vectorstore/query"), request)?;
    let response = expect_status(response, "PUT", StatusCode::OK)?;
    Ok(decode_json(response)?)
}

/// CLI entry point for `query`.
pub fn run_query(config: &Config, text: &str, k: u32, include_content: bool) -> Result<()> {
    let session = Session::resolve(config)?;
    let request = QueryRequest {
        query: text.to_string(),
        k,
        include_content,
    };
    let results = query(&session, &request).context("there was an issue sending the query")?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
