use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub source: String,
    pub stdin: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Seam between the grading engine and the external execution endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, req: &ExecutionRequest) -> Result<ExecutionOutcome>;
}

#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    endpoint: String,
}

impl HttpExecutor {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build http client");
        Self { client, endpoint }
    }
}

#[async_trait]
impl CodeExecutor for HttpExecutor {
    async fn execute(&self, req: &ExecutionRequest) -> Result<ExecutionOutcome> {
        let resp = self.client.post(&self.endpoint).json(req).send().await?;

        if !resp.status().is_success() {
            return Err(Error::Executor(format!(
                "execution endpoint returned {}",
                resp.status()
            )));
        }

        let outcome = resp
            .json::<ExecutionOutcome>()
            .await
            .map_err(|e| Error::Executor(format!("malformed execution response: {}", e)))?;
        Ok(outcome)
    }
}
