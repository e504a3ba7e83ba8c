//! Raw request handler.

use anyhow::{Context, Result};
use rxdesk_core::{ApiClient, ApiRequest};
use serde_json::Value;

use super::{print_value, report};

pub async fn raw(
    client: &ApiClient,
    method: reqwest::Method,
    path: &str,
    data: Option<&str>,
    query: Vec<(String, String)>,
) -> Result<()> {
    let mut request = ApiRequest::new(method, path);
    request.query = query;
    if let Some(data) = data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.with_body(body);
    }

    let response = client.execute(&request).await.map_err(report)?;
    match response.value() {
        Ok(value) if !value.is_null() => print_value(&value, false),
        Ok(_) => Ok(()),
        // Not JSON: print as received.
        Err(_) => {
            println!("{}", response.text());
            Ok(())
        }
    }
}
