//! Website ingestion and website vectorization.
//!
//! Crawling, route filtering and page storage all happen on the service; the
//! client only shapes the request and prints what comes back.

use anyhow::{Context, Result};
use reqwest::StatusCode;

use crate::client::{decode_json, expect_status};
use crate::config::Config;
use crate::models::{SiteRequest, SiteResponse};
use crate::session::Session;

/// Split a comma-separated pattern list. An empty string means no patterns.
pub fn parse_patterns(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|p| p.to_string()).collect()
}

pub fn ingest_site(session: &Session, request: &SiteRequest) -> Result<SiteResponse> {
    let response = session
        .client
        .post_json(&session.customer_path("/websites"), request)?;
    let response = expect_status(response, "POST", StatusCode::OK)?;
    Ok(decode_json(response)?)
}

pub fn vectorize_websites(session: &Session) -> Result<()> {
    let response = session
        .client
        .put_empty(&session.customer_path("/vectorizeWebsites"))?;
    expect_status(response, "PUT", StatusCode::NO_CONTENT)
        .context("error sending the vectorization request")?;
    Ok(())
}

/// CLI entry point for `ingest-web`.
pub fn run_ingest_web(
    config: &Config,
    domain: &str,
    insert: bool,
    whitelist: &str,
    blacklist: &str,
) -> Result<()> {
    let session = Session::resolve(config)?;
    let request = SiteRequest {
        domain: domain.to_string(),
        whitelist: parse_patterns(whitelist),
        blacklist: parse_patterns(blacklist),
        insert,
    };

    let response = ingest_site(&session, &request)
        .with_context(|| format!("error ingesting the website {}", domain))?;

    println!("---\nSite:");
    println!("{}", serde_json::to_string_pretty(&response.site)?);
    println!("---\nPages:");
    for page in &response.pages {
        println!("{}", page.url);
    }
    Ok(())
}

/// CLI entry point for `vec-web`.
pub fn run_vectorize_websites(config: &Config) -> Result<()> {
    let session = Session::resolve(config)?;
    vectorize_websites(&session).context("There was an issue vectorizing the websites")?;
    println!("vectorization of websites requested");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_string_is_empty_list() {
        assert!(parse_patterns("").is_empty());
    }

    #[test]
    fn patterns_split_on_commas() {
        assert_eq!(
            parse_patterns("^/blog/.*,^/docs/"),
            vec!["^/blog/.*".to_string(), "^/docs/".to_string()]
        );
    }

    #[test]
    fn site_response_tolerates_missing_pages() {
        let resp: SiteResponse =
            serde_json::from_value(serde_json::json!({"site": {"domain": "https://a.io"}}))
                .unwrap();
        assert!(resp.pages.is_empty());
        assert_eq!(resp.site["domain"], "https://a.io");
    }
}
