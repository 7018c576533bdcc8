//! GitHub contents-API implementation of the content host.
//!
//! Wire contract: `GET` on the contents endpoint returns
//! `{content: <base64>, sha: <revision>}` or 404; `PUT` accepts
//! `{message, content: <base64>, branch, sha?}` and returns the new `sha`
//! on success, or a non-2xx status with a message body on conflict.

use crate::api::{ContentHost, PutPayload, RemoteFile};
use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire body for a conditional PUT, including the branch the trait-level
/// payload does not carry.
#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutResponseContent,
}

#[derive(Debug, Deserialize)]
struct PutResponseContent {
    sha: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// A [`ContentHost`] backed by the GitHub contents API.
pub struct GitHubHost {
    config: RemoteConfig,
    client: Client,
}

impl GitHubHost {
    /// Creates a host from the given configuration.
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {}", config.token))
            .map_err(|e| RemoteError::transport_fatal(format!("invalid token: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
        headers.insert(USER_AGENT, HeaderValue::from_static("stockpile"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteError::transport_fatal(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Returns the configuration this host was built with.
    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn error_message(response: reqwest::blocking::Response) -> String {
        response.json::<ApiMessage>().unwrap_or_default().message
    }
}

impl ContentHost for GitHubHost {
    fn fetch(&self) -> RemoteResult<Option<RemoteFile>> {
        let url = format!("{}?ref={}", self.config.contents_url(), self.config.branch);
        debug!(url = %url, "fetching remote file");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RemoteError::transport_retryable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let file: RemoteFile = response
                    .json()
                    .map_err(|e| RemoteError::format(format!("contents response: {e}")))?;
                Ok(Some(file))
            }
            status => Err(RemoteError::Transport {
                message: format!("GET {}: {}", status, Self::error_message(response)),
                retryable: status.is_server_error(),
            }),
        }
    }

    fn store(&self, payload: &PutPayload) -> RemoteResult<String> {
        let url = self.config.contents_url();
        debug!(url = %url, has_sha = payload.sha.is_some(), "writing remote file");

        let body = PutBody {
            message: &payload.message,
            content: &payload.content,
            branch: &self.config.branch,
            sha: payload.sha.as_deref(),
        };

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .map_err(|e| RemoteError::transport_retryable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let parsed: PutResponse = response
                    .json()
                    .map_err(|e| RemoteError::format(format!("write response: {e}")))?;
                Ok(parsed.content.sha)
            }
            // The API reports a stale or missing revision as 409 or 422.
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(RemoteError::conflict(Self::error_message(response)))
            }
            status => Err(RemoteError::Transport {
                message: format!("PUT {}: {}", status, Self::error_message(response)),
                retryable: status.is_server_error(),
            }),
        }
    }
}
