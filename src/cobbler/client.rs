// Cobbler XML-RPC HTTP client.
// Posts method calls to the Cobbler API endpoint and decodes the responses.

use std::time::Duration;

use reqwest::{
    Client, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::debug;

use crate::error::{InventoryError, Result};

use super::ProvisioningClient;
use super::types::HostRecord;
use super::xmlrpc;

/// Client for the Cobbler XML-RPC API (`http://<server>/cobbler_api`).
pub struct CobblerClient {
    client: Client,
    endpoint: String,
}

impl CobblerClient {
    /// Create a client for the given API endpoint.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
        headers.insert(USER_AGENT, HeaderValue::from_static("cobbler-inventory"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(InventoryError::Connection)?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke an API method with string parameters.
    pub async fn call(&self, method: &str, params: &[&str]) -> Result<Value> {
        debug!(method, endpoint = %self.endpoint, "calling Cobbler API");
        let response = self
            .client
            .post(&self.endpoint)
            .body(xmlrpc::encode_call(method, params))
            .send()
            .await
            .map_err(InventoryError::Connection)?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                xmlrpc::decode_response(&body)
            }
            status => Err(InventoryError::HttpStatus { status }),
        }
    }
}

impl ProvisioningClient for CobblerClient {
    async fn get_systems(&mut self, token: Option<&str>) -> Result<Vec<HostRecord>> {
        let systems = match token {
            Some(token) => self.call("get_systems", &[token]).await?,
            None => self.call("get_systems", &[]).await?,
        };

        match systems {
            Value::Array(_) => serde_json::from_value(systems).map_err(|e| {
                InventoryError::Protocol(format!("unexpected system record shape: {}", e))
            }),
            other => Err(InventoryError::Protocol(format!(
                "get_systems returned {} instead of a list",
                type_name(&other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a struct",
    }
}
