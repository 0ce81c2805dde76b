//! REANA API client utilities.
//!
//! This crate is the dashboard's remote data gateway. It provides:
//!
//! - [`WorkflowGateway`], the asynchronous request functions the TUI consumes
//! - [`ReanaClient`], the reqwest-backed implementation talking to a REANA
//!   server
//! - [`GatewayError`], the failure taxonomy (`NotFound` vs. everything else)
//!
//! # Example
//!
//! ```ignore
//! use reana_api::{ReanaClient, WorkflowGateway};
//! use reana_types::FetchOptions;
//!
//! async fn show(id: &str) -> Result<(), reana_api::GatewayError> {
//!     let client = ReanaClient::new("https://reana.cern.ch", Some("token".into()))?;
//!     let workflow = client.fetch_workflow(id, FetchOptions::default()).await?;
//!     println!("{} is {}", workflow.display_name(), workflow.status);
//!     Ok(())
//! }
//! ```

mod error;
mod wire;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reana_types::{FetchOptions, LogBundle, ServerConfig, SessionHandle, Workflow, WorkspaceFile};
use reana_util::redact_sensitive;
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

pub use error::GatewayError;
use wire::{
    ConfigResponse, LogsResponse, OpenSessionResponse, SpecificationResponse, WorkflowListResponse, WorkspaceResponse,
};

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];
/// Characters escaped when a workflow identifier is used as a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'/').add(b'?').add(b'#').add(b'%');

/// Asynchronous request functions the dashboard needs from the server.
///
/// Every call resolves to success or a [`GatewayError`]; callers never see a
/// panic from this layer.
#[async_trait]
pub trait WorkflowGateway: Send + Sync {
    /// Metadata of one workflow. `GatewayError::NotFound` when the identifier
    /// does not resolve to a workflow the caller may see.
    async fn fetch_workflow(&self, workflow_id: &str, options: FetchOptions) -> Result<Workflow, GatewayError>;

    async fn fetch_workflow_logs(&self, workflow_id: &str, options: FetchOptions) -> Result<LogBundle, GatewayError>;

    async fn open_interactive_session(&self, workflow_id: &str) -> Result<SessionHandle, GatewayError>;

    async fn close_interactive_session(&self, workflow_id: &str) -> Result<(), GatewayError>;

    /// Delete the workflow together with its workspace. On an already deleted
    /// workflow this only frees the workspace.
    async fn delete_workflow(&self, workflow_id: &str) -> Result<(), GatewayError>;

    async fn stop_workflow(&self, workflow_id: &str) -> Result<(), GatewayError>;

    async fn fetch_workspace(&self, workflow_id: &str) -> Result<Vec<WorkspaceFile>, GatewayError>;

    async fn fetch_specification(&self, workflow_id: &str) -> Result<Value, GatewayError>;

    async fn fetch_config(&self) -> Result<ServerConfig, GatewayError>;
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for REANA API access.
///
/// Requests are resolved against a validated base URL and carry the access
/// token as the `access_token` query parameter, which is how the REANA
/// server expects it.
pub struct ReanaClient {
    pub base_url: Url,
    pub http: Client,
    pub user_agent: String,
    access_token: Option<String>,
}

impl ReanaClient {
    /// Construct a [`ReanaClient`] for `server_url`.
    ///
    /// Non-localhost servers must use HTTPS.
    pub fn new(server_url: &str, access_token: Option<String>) -> Result<Self, GatewayError> {
        let base_url = validate_base_url(server_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("reana-tui/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            access_token,
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut url = self.base_url.clone();
        // Servers mounted under a prefix keep it in front of the API path.
        let prefix = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));
        if let Some(token) = self.access_token.as_deref() {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        debug!(url = %redact_sensitive(url.as_str()), %method, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// Send a request and decode a JSON body, mapping non-success statuses
    /// through [`GatewayError::from_status`].
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::from_status(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::from_status(status, &body))
    }
}

fn workflow_path(workflow_id: &str, suffix: &str) -> String {
    let encoded = utf8_percent_encode(workflow_id, PATH_SEGMENT);
    format!("/api/workflows/{encoded}/{suffix}")
}

fn with_refetch(builder: RequestBuilder, options: FetchOptions) -> RequestBuilder {
    if options.refetch {
        builder.header(header::CACHE_CONTROL, "no-cache")
    } else {
        builder
    }
}

#[async_trait]
impl WorkflowGateway for ReanaClient {
    async fn fetch_workflow(&self, workflow_id: &str, options: FetchOptions) -> Result<Workflow, GatewayError> {
        let builder = self.request(Method::GET, "/api/workflows").query(&[
            ("type", "batch"),
            ("workflow_id_or_name", workflow_id),
            ("include_progress", "true"),
            ("include_workspace_size", "true"),
        ]);
        let response: WorkflowListResponse = self.send_json(with_refetch(builder, options)).await?;
        response
            .items
            .into_iter()
            .next()
            .map(Workflow::from)
            .ok_or(GatewayError::NotFound)
    }

    async fn fetch_workflow_logs(&self, workflow_id: &str, options: FetchOptions) -> Result<LogBundle, GatewayError> {
        let builder = self.request(Method::GET, &workflow_path(workflow_id, "logs"));
        let response: LogsResponse = self.send_json(with_refetch(builder, options)).await?;
        response.into_bundle()
    }

    async fn open_interactive_session(&self, workflow_id: &str) -> Result<SessionHandle, GatewayError> {
        let builder = self
            .request(Method::POST, &workflow_path(workflow_id, "open/jupyter"))
            .json(&json!({}));
        let response: OpenSessionResponse = self.send_json(builder).await?;
        Ok(response.into())
    }

    async fn close_interactive_session(&self, workflow_id: &str) -> Result<(), GatewayError> {
        let builder = self.request(Method::POST, &workflow_path(workflow_id, "close/"));
        self.send_unit(builder).await
    }

    async fn delete_workflow(&self, workflow_id: &str) -> Result<(), GatewayError> {
        let builder = self
            .request(Method::PUT, &workflow_path(workflow_id, "status"))
            .query(&[("status", "deleted")])
            .json(&json!({ "workspace": true, "all_runs": false }));
        self.send_unit(builder).await
    }

    async fn stop_workflow(&self, workflow_id: &str) -> Result<(), GatewayError> {
        let builder = self
            .request(Method::PUT, &workflow_path(workflow_id, "status"))
            .query(&[("status", "stop")])
            .json(&json!({}));
        self.send_unit(builder).await
    }

    async fn fetch_workspace(&self, workflow_id: &str) -> Result<Vec<WorkspaceFile>, GatewayError> {
        let builder = self.request(Method::GET, &workflow_path(workflow_id, "workspace"));
        let response: WorkspaceResponse = self.send_json(builder).await?;
        Ok(response.items.into_iter().map(WorkspaceFile::from).collect())
    }

    async fn fetch_specification(&self, workflow_id: &str) -> Result<Value, GatewayError> {
        let builder = self.request(Method::GET, &workflow_path(workflow_id, "specification"));
        let response: SpecificationResponse = self.send_json(builder).await?;
        Ok(response.specification)
    }

    async fn fetch_config(&self) -> Result<ServerConfig, GatewayError> {
        let builder = self.request(Method::GET, "/api/config");
        let response: ConfigResponse = self.send_json(builder).await?;
        Ok(response.into())
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<Url, GatewayError> {
    let parsed_base_url =
        Url::parse(base).map_err(|e| GatewayError::InvalidBaseUrl(format!("'{}': {}", base, e)))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| GatewayError::InvalidBaseUrl(format!("'{}' must include a host", base)))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(parsed_base_url);
    }

    if parsed_base_url.scheme() != "https" {
        return Err(GatewayError::InvalidBaseUrl(format!(
            "'{}' must use https for non-localhost hosts; got '{}://'",
            base,
            parsed_base_url.scheme()
        )));
    }

    Ok(parsed_base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_and_localhost_urls_are_accepted() {
        assert!(validate_base_url("https://reana.cern.ch").is_ok());
        assert!(validate_base_url("http://localhost:30080").is_ok());
        assert!(validate_base_url("http://127.0.0.1:5000").is_ok());
    }

    #[test]
    fn plain_http_remote_and_garbage_are_rejected() {
        assert!(matches!(
            validate_base_url("http://reana.cern.ch"),
            Err(GatewayError::InvalidBaseUrl(_))
        ));
        assert!(matches!(validate_base_url("not a url"), Err(GatewayError::InvalidBaseUrl(_))));
    }

    #[test]
    fn request_carries_token_and_encoded_path() {
        let client = ReanaClient::new("https://reana.example.org", Some("tok".into())).expect("client");
        let request = client
            .request(Method::GET, &workflow_path("roofit.3", "logs"))
            .build()
            .expect("request");
        assert_eq!(request.url().path(), "/api/workflows/roofit.3/logs");
        assert_eq!(request.url().query(), Some("access_token=tok"));
        assert!(request.headers().contains_key(header::USER_AGENT));
    }

    #[test]
    fn request_keeps_the_base_url_path_prefix() {
        let client = ReanaClient::new("https://host/reana/", None).expect("client");
        let request = client.request(Method::GET, "/api/config").build().expect("request");
        assert_eq!(request.url().as_str(), "https://host/reana/api/config");

        let bare = ReanaClient::new("https://host", None).expect("client");
        let request = bare.request(Method::GET, "/api/config").build().expect("request");
        assert_eq!(request.url().as_str(), "https://host/api/config");
    }

    #[test]
    fn workflow_path_escapes_separators() {
        assert_eq!(workflow_path("a/b", "status"), "/api/workflows/a%2Fb/status");
    }
}
