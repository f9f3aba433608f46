use serde::Deserialize;
use serde_json::Value;

use crate::model::ClientConfig;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Anything that can go wrong talking to the service. Callers treat every
/// variant the same way: surface a notice and reload from the server.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with `ok: false`.
    #[error("server rejected {cmd}")]
    Rejected { cmd: String },
    #[error("malformed response for {cmd}: {detail}")]
    Malformed { cmd: String, detail: String },
}

/// Transport seam: one POST per operation, command name in the URL path,
/// JSON body in, unwrapped `data` payload out.
pub trait Backend {
    fn post(&self, cmd: &str, body: Value) -> ServiceResult<Value>;
}

/// Every response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    data: Value,
}

/// Blocking HTTP transport against the real service.
pub struct HttpBackend {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn from_config(config: &ClientConfig) -> ServiceResult<HttpBackend> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(HttpBackend {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Backend for HttpBackend {
    fn post(&self, cmd: &str, body: Value) -> ServiceResult<Value> {
        let url = format!("{}/{}", self.base_url, cmd);
        tracing::debug!(%cmd, "posting request");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let envelope: Envelope = resp.json().map_err(|e| ServiceError::Malformed {
            cmd: cmd.to_string(),
            detail: e.to_string(),
        })?;
        if !envelope.ok {
            tracing::warn!(%cmd, "server rejected request");
            return Err(ServiceError::Rejected {
                cmd: cmd.to_string(),
            });
        }
        Ok(envelope.data)
    }
}
