use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the service rejects a request without saying why.
pub const GENERATE_FALLBACK_ERROR: &str = "Failed to generate BDD test cases";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    requirement: &'a str,
}

/// A generated feature file as returned by `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Generated {
    pub gherkin: String,
    pub filename: String,
    #[serde(default)]
    pub run_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The service answered with a non-success status.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed or the reply could not be read.
    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Clone)]
pub struct GeneratorClient {
    client: Client,
    base_url: String,
}

impl GeneratorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn generate(&self, requirement: &str) -> Result<Generated, GenerateError> {
        let url = format!("{}/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { requirement })
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if status.is_success() {
            let generated: Generated = serde_json::from_str(&body)
                .map_err(|e| GenerateError::Network(format!("invalid response body: {}", e)))?;
            tracing::info!(filename = %generated.filename, "feature file generated");
            Ok(generated)
        } else {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERATE_FALLBACK_ERROR.to_string());
            tracing::warn!(%status, %message, "generate request rejected");
            Err(GenerateError::Rejected(message))
        }
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Health check failed with status: {}", response.status()));
        }

        let health: HealthStatus = response.json().await?;
        Ok(health)
    }

    /// Fetch `GET /download/{filename}` and write it into `dir`. Returns the saved path.
    pub async fn download(&self, filename: &str, dir: &Path) -> Result<PathBuf> {
        let url = self.download_url(filename)?;

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("server returned {}", status));
            return Err(anyhow!(message));
        }

        let bytes = response.bytes().await?;

        // Never let a server-chosen name escape the download directory.
        let local_name = Path::new(filename)
            .file_name()
            .ok_or_else(|| anyhow!("Invalid filename: {}", filename))?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(local_name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "feature file downloaded");
        Ok(path)
    }

    fn download_url(&self, filename: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Server URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["download", filename]);
        Ok(url)
    }
}
