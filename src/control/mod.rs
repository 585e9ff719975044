//! Resource control API client
//!
//! Lock and release calls against the rotest web server:
//!
//! - `GET /api/rotest/lock_resource/{name}`
//! - `GET /api/rotest/release_owner/{name}`
//! - `GET /api/rotest/release_reserved/{name}`
//!
//! Responses are informational. The cache learns about the new lock state
//! through the push feed, never from these responses.

use crate::config::ControlConfig;
use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use url::Url;

/// Outbound control operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Lock,
    ReleaseOwner,
    ReleaseReserved,
}

impl ControlAction {
    /// Endpoint name under `/api/rotest/`
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Lock => "lock_resource",
            Self::ReleaseOwner => "release_owner",
            Self::ReleaseReserved => "release_reserved",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => write!(f, "Lock"),
            Self::ReleaseOwner => write!(f, "Release (owner)"),
            Self::ReleaseReserved => write!(f, "Release (reserved)"),
        }
    }
}

/// Body returned by the control endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Resources whose lock state changed, including sub-resources
    #[serde(default)]
    pub effected_resources: Vec<String>,

    /// User now holding the lock (lock calls only)
    #[serde(default)]
    pub user: Option<String>,
}

/// HTTP client for the control endpoints
#[derive(Clone)]
pub struct ControlClient {
    base: Url,
    agent: ureq::Agent,
}

impl ControlClient {
    pub fn new(config: &ControlConfig) -> BoardResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| BoardError::ControlUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(BoardError::ControlUrl {
                url: config.base_url.clone(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build()
            .into();

        Ok(Self { base, agent })
    }

    /// Full endpoint URL for `action` on `resource`
    pub fn url_for(&self, action: ControlAction, resource: &str) -> BoardResult<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| BoardError::ControlUrl {
                url: self.base.to_string(),
                reason: "cannot append a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "rotest", action.endpoint(), resource]);
        Ok(url)
    }

    pub async fn lock(&self, resource: &str) -> BoardResult<ControlResponse> {
        self.send(ControlAction::Lock, resource).await
    }

    pub async fn release_owner(&self, resource: &str) -> BoardResult<ControlResponse> {
        self.send(ControlAction::ReleaseOwner, resource).await
    }

    pub async fn release_reserved(&self, resource: &str) -> BoardResult<ControlResponse> {
        self.send(ControlAction::ReleaseReserved, resource).await
    }

    /// Issue a control call on the blocking pool
    pub async fn send(
        &self,
        action: ControlAction,
        resource: &str,
    ) -> BoardResult<ControlResponse> {
        if resource.trim().is_empty() {
            return Err(BoardError::User("Resource name must not be empty".to_string()));
        }

        let url = self.url_for(action, resource)?;
        let agent = self.agent.clone();
        let name = resource.to_string();
        debug!("GET {}", url);

        let body = tokio::task::spawn_blocking(move || fetch(&agent, &url, action, &name))
            .await
            .map_err(|e| BoardError::Internal(format!("control task failed: {}", e)))??;

        let response = parse_response(&body);
        info!(
            "{} {}: {} resource(s) affected",
            action,
            resource,
            response.effected_resources.len()
        );
        Ok(response)
    }
}

fn fetch(
    agent: &ureq::Agent,
    url: &Url,
    action: ControlAction,
    resource: &str,
) -> BoardResult<String> {
    let request_error = |reason: String| BoardError::ControlRequest {
        action: action.endpoint().to_string(),
        resource: resource.to_string(),
        reason,
    };

    let mut response = agent.get(url.as_str()).call().map_err(|e| match e {
        ureq::Error::StatusCode(status) => BoardError::ControlStatus {
            action: action.endpoint().to_string(),
            resource: resource.to_string(),
            status,
        },
        other => request_error(other.to_string()),
    })?;

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| request_error(e.to_string()))
}

/// Lenient body parse; older servers answer with an empty body
fn parse_response(body: &str) -> ControlResponse {
    if body.trim().is_empty() {
        return ControlResponse::default();
    }
    match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            debug!("Ignoring unparseable control response: {}", e);
            ControlResponse::default()
        }
    }
}
