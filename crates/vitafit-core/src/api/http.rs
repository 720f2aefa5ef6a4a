//! JSON-over-HTTP implementation of [`Backend`] using `reqwest`.

use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;

use super::error::{ApiError, render_error_body};
use super::types::{
    ChatReply, ChatRequest, DietEnvelope, DietPlan, DietRequest, ExerciseEnvelope, ExercisePlan,
    ExerciseRequest, ReportDocument, ReportRequest, filename_from_content_disposition,
};
use super::Backend;

/// Backend client talking to the configured base address.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Use a preconfigured client (proxies, timeouts, TLS settings).
    pub fn with_client(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// POST a JSON body and return the raw response once its status is a
    /// success. Non-success statuses are turned into [`ApiError::Status`]
    /// with the rendered `detail`, if any.
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%url, error = %e, "failed to read error body");
                Default::default()
            }
        };
        let detail = render_error_body(&bytes);
        tracing::warn!(%url, status = status.as_u16(), detail = ?detail, "backend call failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn predict_exercise(&self, req: &ExerciseRequest) -> Result<ExercisePlan, ApiError> {
        let envelope: ExerciseEnvelope = self.post_json("/predict_exercise", req).await?;
        Ok(envelope.exercise_plan)
    }

    async fn predict_diet(&self, req: &DietRequest) -> Result<DietPlan, ApiError> {
        let envelope: DietEnvelope = self.post_json("/predict_diet", req).await?;
        Ok(envelope.diet_plan)
    }

    async fn generate_report(&self, req: &ReportRequest) -> Result<ReportDocument, ApiError> {
        let response = self.post("/generate_report", req).await?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(ReportDocument {
            filename,
            bytes: bytes.to_vec(),
        })
    }

    async fn overview(&self, req: &ChatRequest) -> Result<String, ApiError> {
        let reply: ChatReply = self.post_json("/ai/overview", req).await?;
        Ok(reply.response)
    }

    async fn chat(&self, req: &ChatRequest) -> Result<String, ApiError> {
        let reply: ChatReply = self.post_json("/ai/chat", req).await?;
        Ok(reply.response)
    }
}
