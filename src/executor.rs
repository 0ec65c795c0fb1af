//! Plan Executor
//!
//! Submits planned batches to the presentation service, one rate-limited
//! `batchUpdate` per batch, and keeps the per-category tallies of the run.

use crate::error::ApiError;
use crate::planner::{ElementCounts, PlannedBatch};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::slides::{BatchUpdateResponse, PresentationService};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateTally {
    pub updated: usize,
    pub skipped: usize,
}

/// Tallies for every element category touched by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub slides: UpdateTally,
    pub text: UpdateTally,
    pub images: UpdateTally,
}

impl RunTotals {
    pub fn record_updated(&mut self, counts: ElementCounts) {
        self.slides.updated += counts.slides;
        self.text.updated += counts.text;
        self.images.updated += counts.images;
    }

    pub fn record_skipped(&mut self, counts: ElementCounts) {
        self.slides.skipped += counts.slides;
        self.text.skipped += counts.text;
        self.images.skipped += counts.images;
    }
}

pub struct PlanExecutor<'a> {
    service: &'a dyn PresentationService,
    presentation_id: String,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(
        service: &'a dyn PresentationService,
        presentation_id: &str,
        limiter: RateLimiter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            service,
            presentation_id: presentation_id.to_string(),
            limiter,
            retry,
        }
    }

    /// Submit one batch. Every attempt, retries included, waits on the
    /// rate limiter first.
    pub async fn submit(&self, batch: &PlannedBatch) -> Result<BatchUpdateResponse, ApiError> {
        debug!(
            slide_number = batch.slide_number,
            commands = batch.commands.len(),
            "Submitting {}",
            batch.description
        );
        self.retry
            .run(&batch.description, || async {
                self.limiter.acquire().await;
                self.service
                    .batch_update(&self.presentation_id, &batch.commands)
                    .await
            })
            .await
    }

    /// Submit a slide-creation batch and return the new slide's object ID.
    ///
    /// The batch requests `slide_object_id` for the slide. If an attempt
    /// fails in transit and a later one is rejected for naming that ID, the
    /// earlier attempt was applied and the slide is reported as created.
    pub async fn create_slide(
        &self,
        batch: &PlannedBatch,
        slide_object_id: &str,
    ) -> Result<String, ApiError> {
        let interrupted = AtomicBool::new(false);
        let interrupted = &interrupted;
        self.retry
            .run(&batch.description, || async move {
                self.limiter.acquire().await;
                match self
                    .service
                    .batch_update(&self.presentation_id, &batch.commands)
                    .await
                {
                    Ok(response) => response.created_slide_id(0),
                    Err(ApiError::ProviderRequestFailed(msg)) => {
                        interrupted.store(true, Ordering::SeqCst);
                        Err(ApiError::ProviderRequestFailed(msg))
                    }
                    Err(ApiError::BatchRejected(msg))
                        if interrupted.load(Ordering::SeqCst) && msg.contains(slide_object_id) =>
                    {
                        info!(
                            slide_number = batch.slide_number,
                            slide_object_id, "Slide was created by an interrupted attempt"
                        );
                        Ok(slide_object_id.to_string())
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }

    /// Submit a batch and record its elements as updated, or as skipped when
    /// the batch fails. A failed batch never stops the run.
    pub async fn execute(
        &self,
        batch: &PlannedBatch,
        totals: &mut RunTotals,
    ) -> Option<BatchUpdateResponse> {
        if batch.commands.is_empty() {
            return None;
        }
        match self.submit(batch).await {
            Ok(response) => {
                totals.record_updated(batch.elements);
                Some(response)
            }
            Err(err) => {
                warn!(
                    slide_number = batch.slide_number,
                    skipped = batch.elements.total(),
                    error = %err,
                    "Batch failed: {}",
                    batch.description
                );
                totals.record_skipped(batch.elements);
                None
            }
        }
    }
}
