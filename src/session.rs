//! Customer session resolution.
//!
//! A [`Session`] pairs the HTTP client with the customer record the
//! configured name resolves to. It is built once per command and then passed
//! by reference to every operation that needs the customer's identity.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tracing::info;

use crate::client::{decode_json, expect_status, ApiClient};
use crate::config::Config;
use crate::models::Customer;

#[derive(Debug, Clone)]
pub struct Session {
    pub client: ApiClient,
    pub customer: Customer,
}

impl Session {
    /// Look the configured customer up on the service.
    pub fn resolve(config: &Config) -> Result<Self> {
        let client = ApiClient::new(config)?;
        let customer = fetch_customer(&client, &config.name)
            .with_context(|| format!("error getting the customer '{}'", config.name))?;
        info!(customer = %customer.id, name = %customer.name, "resolved customer");
        Ok(Self { client, customer })
    }

    /// Service path scoped to this customer, e.g. `customer_path("/folders")`.
    pub fn customer_path(&self, suffix: &str) -> String {
        format!("/customers/{}{}", self.customer.id, suffix)
    }
}

pub fn fetch_customer(client: &ApiClient, name: &str) -> Result<Customer> {
    let response = client.get("/tests/customers/get", &[("name", name)])?;
    let response = expect_status(response, "GET", StatusCode::OK)?;
    Ok(decode_json(response)?)
}

/// CLI entry point for `get-customer`.
pub fn run_get_customer(config: &Config) -> Result<()> {
    let session = Session::resolve(config)?;
    println!("{}", serde_json::to_string_pretty(&session.customer)?);
    Ok(())
}
