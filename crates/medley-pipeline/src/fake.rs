//! Fake pipeline for tests
//!
//! Records submitted jobs instead of sending them anywhere, and can be
//! switched into a failing mode to exercise dispatch-failure paths.

use crate::traits::{JobPipeline, PipelineError, PipelineResult, ProcessingJob};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct FakeJobPipeline {
    submitted: Mutex<Vec<ProcessingJob>>,
    failing: AtomicBool,
}

impl FakeJobPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// When failing, every submit is rejected without being recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn submitted(&self) -> Vec<ProcessingJob> {
        self.submitted.lock().await.clone()
    }

    pub async fn submitted_count(&self) -> usize {
        self.submitted.lock().await.len()
    }
}

#[async_trait]
impl JobPipeline for FakeJobPipeline {
    async fn submit(&self, job: &ProcessingJob) -> PipelineResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PipelineError::Rejected(
                "503 Service Unavailable - job queue is full".to_string(),
            ));
        }
        self.submitted.lock().await.push(job.clone());
        Ok(())
    }
}
