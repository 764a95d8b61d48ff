//! Summarization agent: sends the prompt to Gemini, walking an ordered list of
//! candidate models until one answers.
//!
//! Every call starts again from the top of the list; the winning model is not
//! remembered between calls. Each candidate gets exactly one attempt.

pub use crate::summary::{ContentDescriptor, SummaryResult};

use crate::config::Config;
use crate::summary::build_prompt;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Public Gemini endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const NO_CANDIDATES: &str = "no candidate models configured";

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("credential rejected ({status}): {reason}")]
    AuthRejected { status: u16, reason: String },
    #[error("service error: {0}")]
    Service(String),
    #[error("Failed to find a working model. Last error: {0}")]
    NoWorkingService(String),
    #[error("no credential available: configure an API key or an OAuth token")]
    MissingCredential,
    #[error("summarization cancelled")]
    Cancelled,
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl AgentError {
    /// The bare reason recorded for a failed attempt
    fn reason(&self) -> String {
        match self {
            AgentError::Transport(reason) | AgentError::Service(reason) => reason.clone(),
            AgentError::AuthRejected { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// One (API version, model) pair tried during fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint_version: String,
    pub model_id: String,
}

impl ServiceConfig {
    pub fn new(endpoint_version: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            endpoint_version: endpoint_version.into(),
            model_id: model_id.into(),
        }
    }
}

impl fmt::Display for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model_id, self.endpoint_version)
    }
}

/// Preferred models first, widely available ones last.
pub fn default_candidates() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig::new("v1beta", "gemini-3-flash"),
        ServiceConfig::new("v1", "gemini-3-flash"),
        ServiceConfig::new("v1beta", "gemini-3-flash-preview"),
        ServiceConfig::new("v1beta", "gemini-2.0-flash"),
        ServiceConfig::new("v1", "gemini-2.0-flash"),
        ServiceConfig::new("v1", "gemini-1.5-flash"),
    ]
}

/// How a request authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as an `Authorization: Bearer` header
    OAuthToken(String),
}

impl Credential {
    /// Pick the credential for a request: a non-blank API key wins over an OAuth token.
    pub fn resolve(api_key: Option<&str>, oauth_token: Option<&str>) -> Result<Self, AgentError> {
        if let Some(key) = non_blank(api_key) {
            return Ok(Credential::ApiKey(key.to_string()));
        }
        if let Some(token) = non_blank(oauth_token) {
            return Ok(Credential::OAuthToken(token.to_string()));
        }
        Err(AgentError::MissingCredential)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api-key",
            Credential::OAuthToken(_) => "oauth",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}, <redacted>)", self.kind())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Where the agent looks for an API key when an OAuth token is rejected.
pub trait KeyStore: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// A store that never has a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeyStore;

impl KeyStore for NoKeyStore {
    fn api_key(&self) -> Option<String> {
        None
    }
}

impl KeyStore for Option<String> {
    fn api_key(&self) -> Option<String> {
        non_blank(self.as_deref()).map(str::to_string)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Runs the model-fallback request strategy.
pub struct Summarizer {
    client: Client,
    base_url: String,
    candidates: Vec<ServiceConfig>,
}

impl Summarizer {
    /// Create a summarizer against `base_url` trying `candidates` in order.
    pub fn new(base_url: impl Into<String>, candidates: Vec<ServiceConfig>) -> Result<Self, AgentError> {
        let client = Client::builder()
            .user_agent(concat!("recap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            candidates,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        Self::new(config.api.base_url.clone(), config.models.clone())
    }

    pub fn candidates(&self) -> &[ServiceConfig] {
        &self.candidates
    }

    /// Summarize the content, falling back through the candidate list.
    pub async fn summarize(
        &self,
        descriptor: &ContentDescriptor,
        credential: Credential,
        keys: &dyn KeyStore,
    ) -> Result<SummaryResult, AgentError> {
        self.summarize_with_cancel(descriptor, credential, keys, &CancellationToken::new())
            .await
    }

    /// Same as [`Summarizer::summarize`], aborting the in-flight attempt once `cancel` fires.
    pub async fn summarize_with_cancel(
        &self,
        descriptor: &ContentDescriptor,
        credential: Credential,
        keys: &dyn KeyStore,
        cancel: &CancellationToken,
    ) -> Result<SummaryResult, AgentError> {
        let prompt = build_prompt(descriptor);
        let mut credential = credential;
        let mut last_error = NO_CANDIDATES.to_string();

        'sequence: loop {
            for candidate in &self.candidates {
                info!(auth = credential.kind(), "Trying model {}", candidate);

                let outcome = tokio::select! {
                    _ = cancel.cancelled() => {
                        warn!("Summarization cancelled during {}", candidate);
                        return Err(AgentError::Cancelled);
                    }
                    outcome = self.attempt(candidate, &prompt, &credential) => outcome,
                };

                match outcome {
                    Ok(result) => {
                        info!("Success with model {}", candidate);
                        return Ok(result);
                    }
                    Err(err @ AgentError::AuthRejected { .. })
                        if matches!(credential, Credential::OAuthToken(_)) =>
                    {
                        last_error = err.reason();
                        if let Some(key) = keys.api_key() {
                            warn!("OAuth token rejected by {}, switching to API key", candidate);
                            credential = Credential::ApiKey(key);
                            continue 'sequence;
                        }
                        debug!("Model {} rejected OAuth token: {}", candidate, last_error);
                    }
                    Err(err) => {
                        last_error = err.reason();
                        debug!("Model {} skipped: {}", candidate, last_error);
                    }
                }
            }
            break;
        }

        warn!("No working model found. Last error: {}", last_error);
        Err(AgentError::NoWorkingService(last_error))
    }

    /// One request against one candidate.
    async fn attempt(
        &self,
        candidate: &ServiceConfig,
        prompt: &str,
        credential: &Credential,
    ) -> Result<SummaryResult, AgentError> {
        let mut url = Url::parse(&format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, candidate.endpoint_version, candidate.model_id
        ))
        .map_err(|e| AgentError::Transport(e.to_string()))?;

        if let Credential::ApiKey(key) = credential {
            url.query_pairs_mut().append_pair("key", key);
        }

        let mut request = self.client.post(url).json(&GenerateRequest::new(prompt));
        if let Credential::OAuthToken(token) = credential {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Transport(e.without_url().to_string()))?;
        let status = response.status();

        if status.is_success() {
            let body: GenerateResponse = response
                .json()
                .await
                .map_err(|e| {
                    AgentError::Service(format!("invalid response body: {}", e.without_url()))
                })?;
            let text = body
                .into_first_text()
                .ok_or_else(|| AgentError::Service("response contained no candidate text".to_string()))?;
            return Ok(SummaryResult::new(text, candidate.model_id.clone()));
        }

        let reason = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| {
                format!(
                    "API error: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                )
            });

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AgentError::AuthRejected {
                status: status.as_u16(),
                reason,
            });
        }
        Err(AgentError::Service(reason))
    }
}
