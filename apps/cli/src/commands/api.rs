//! Raw API commands: single requests and concurrent probes.

use super::Client;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use futures_util::future::join_all;
use serde::Serialize;
use session_gateway::{ApiRequest, ApiResponse, Method};
use tracing::debug;

fn build_request(method: &str, path: &str, data: Option<&str>) -> Result<ApiRequest> {
    let method: Method = method.parse()?;
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let mut request = ApiRequest::new(method, path);
    if let Some(data) = data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("--data must be valid JSON")?;
        request = request.with_body(body);
    }
    Ok(request)
}

fn body_value(response: &ApiResponse) -> serde_json::Value {
    response
        .json::<serde_json::Value>()
        .unwrap_or_else(|_| serde_json::Value::String(response.text()))
}

/// Perform one request through the gateway and print the response.
pub async fn request(
    client: &Client,
    method: &str,
    path: &str,
    data: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let request = build_request(method, path, data)?;
    debug!(method = %request.method(), path = request.path(), "Sending request");
    let response = client.gateway.perform(request).await?;

    match format {
        OutputFormat::Text => {
            println!("HTTP {}", response.status());
            if !response.body().is_empty() {
                match response.json::<serde_json::Value>() {
                    Ok(json) => output::print_json(&json),
                    Err(_) => println!("{}", response.text()),
                }
            }
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "status": response.status(),
            "body": body_value(&response),
        })),
    }

    if !response.is_success() {
        anyhow::bail!("Request failed with HTTP {}", response.status());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProbeResult {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Fire `concurrency` GETs at once through one gateway and report how many
/// renewals they caused.
pub async fn probe(client: &Client, path: &str, concurrency: usize, format: OutputFormat) -> Result<()> {
    if concurrency == 0 {
        anyhow::bail!("--concurrency must be at least 1");
    }

    let calls = (0..concurrency).map(|index| {
        let gateway = client.gateway.clone();
        let request = build_request("GET", path, None);
        async move {
            let outcome = match request {
                Ok(request) => gateway.perform(request).await.map_err(anyhow::Error::from),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(response) => ProbeResult {
                    index,
                    status: Some(response.status()),
                    error: None,
                },
                Err(err) => ProbeResult {
                    index,
                    status: None,
                    error: Some(err.to_string()),
                },
            }
        }
    });
    let results = join_all(calls).await;
    let stats = client.gateway.coordinator().stats();

    match format {
        OutputFormat::Text => {
            output::print_heading(&format!("GET {} x{}", path, concurrency));
            for result in &results {
                let outcome = match (&result.status, &result.error) {
                    (Some(status), _) => format!("HTTP {}", status),
                    (None, Some(error)) => error.clone(),
                    (None, None) => "no outcome".to_string(),
                };
                output::print_row(&format!("#{}", result.index), &outcome);
            }
            output::print_heading("Renewal");
            output::print_row("Started", &stats.renewals_started.to_string());
            output::print_row("Succeeded", &stats.renewals_succeeded.to_string());
            output::print_row("Failed", &stats.renewals_failed.to_string());
            output::print_row("Waiters", &stats.waiters_enrolled.to_string());
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "results": results,
            "coordinator": stats,
        })),
    }
    Ok(())
}
