//! Recording build trigger for tests.

use crate::mapping::ExtractedParameters;
use crate::trigger::{BuildHandle, BuildTrigger, TriggerError};
use crate::CorrelationId;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One recorded trigger call.
#[derive(Debug, Clone)]
pub struct RecordedTrigger {
    pub job: String,
    pub parameters: ExtractedParameters,
    pub correlation_id: CorrelationId,
}

/// A build trigger that records every call and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingBuildTrigger {
    calls: Arc<Mutex<Vec<RecordedTrigger>>>,
    failure: Arc<Mutex<Option<TriggerError>>>,
}

impl RecordingBuildTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent trigger call fail with `error`.
    pub async fn fail_with(&self, error: TriggerError) {
        *self.failure.lock().await = Some(error);
    }

    /// Snapshot of the calls recorded so far.
    pub async fn calls(&self) -> Vec<RecordedTrigger> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl BuildTrigger for RecordingBuildTrigger {
    async fn trigger_build(
        &self,
        job: &str,
        parameters: &ExtractedParameters,
        correlation_id: &CorrelationId,
    ) -> Result<BuildHandle, TriggerError> {
        if let Some(error) = self.failure.lock().await.clone() {
            return Err(error);
        }

        let mut calls = self.calls.lock().await;
        calls.push(RecordedTrigger {
            job: job.to_string(),
            parameters: parameters.clone(),
            correlation_id: correlation_id.clone(),
        });
        Ok(BuildHandle {
            build_id: format!("build-{}", calls.len()),
            build_url: None,
        })
    }

    async fn health_check(&self) -> Result<(), TriggerError> {
        Ok(())
    }
}
