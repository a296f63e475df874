//! Resolver backed by an HTTP endpoint picker shim.
//!
//! The shim sits in front of the real picker: it takes the target picker in
//! `X-EPP-Host` / `X-EPP-Port`, replays the request to it, and answers with
//! the chosen endpoint in `x-gateway-destination-endpoint`.

use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::Method;
use url::Url;

use crate::resolver::{EndpointResolver, ResolutionRequest, ResolveError};

pub const EPP_HOST_HEADER: &str = "x-epp-host";
pub const EPP_PORT_HEADER: &str = "x-epp-port";
pub const DESTINATION_ENDPOINT_HEADER: &str = "x-gateway-destination-endpoint";

#[derive(Debug, Clone)]
pub struct HttpPickerResolver {
    client: reqwest::Client,
    picker_url: Url,
}

impl HttpPickerResolver {
    pub fn new(picker_url: Url, connect_timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .no_proxy()
            .build()
            .map_err(|e| ResolveError::Setup(e.to_string()))?;
        Ok(Self { client, picker_url })
    }

    async fn pick(&self, request: &ResolutionRequest) -> Result<String, ResolveError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| ResolveError::Transport(format!("invalid method: {}", e)))?;

        let forwarded: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&request.serialized_context).unwrap_or_default();

        let mut builder = self
            .client
            .request(method, self.picker_url.clone())
            .header(EPP_HOST_HEADER, request.host.as_str())
            .header(EPP_PORT_HEADER, request.port.as_str());
        for (name, value) in &forwarded {
            if let Some(value) = value.as_str() {
                builder = builder.header(name.as_str(), value);
            }
        }

        let response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match text.trim() {
                "" => format!("endpoint picker returned {}", status),
                body => body.to_string(),
            };
            return Err(ResolveError::Engine(message));
        }

        match response
            .headers()
            .get(DESTINATION_ENDPOINT_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some(endpoint) if !endpoint.is_empty() => Ok(endpoint.to_string()),
            _ => Err(ResolveError::Engine(format!(
                "endpoint picker response has no {} header",
                DESTINATION_ENDPOINT_HEADER
            ))),
        }
    }
}

impl EndpointResolver for HttpPickerResolver {
    fn resolve<'a>(
        &'a self,
        request: &'a ResolutionRequest,
    ) -> BoxFuture<'a, Result<String, ResolveError>> {
        self.pick(request).boxed()
    }
}
