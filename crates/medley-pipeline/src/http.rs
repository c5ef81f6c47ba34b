//! HTTP pipeline client
//!
//! Submits jobs to the processing pipeline's intake endpoint as JSON. The
//! pipeline authenticates us by bearer token and calls back on our webhook
//! endpoints when the job progresses.

use crate::traits::{JobPipeline, PipelineError, PipelineResult, ProcessingJob};
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpJobPipeline {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpJobPipeline {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> PipelineResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl JobPipeline for HttpJobPipeline {
    async fn submit(&self, job: &ProcessingJob) -> PipelineResult<()> {
        let mut request = self.http_client.post(&self.endpoint).json(job);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                job_id = %job.job_id,
                public_id = %job.public_id,
                status = %status,
                "Pipeline rejected job submission"
            );
            return Err(PipelineError::Rejected(format!(
                "{} - {}",
                status, error_text
            )));
        }

        tracing::info!(
            job_id = %job.job_id,
            public_id = %job.public_id,
            kind = %job.kind,
            "Submitted processing job"
        );

        Ok(())
    }
}
