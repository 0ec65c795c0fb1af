//! Orchestrator
//!
//! Runs the three phases in order against one presentation: create slides,
//! update text, update images. Element and batch failures are tallied and the
//! run continues; only setup problems are returned as errors.

use crate::document::{SlideContentDocument, SlideSpec};
use crate::error::ApiError;
use crate::executor::{PlanExecutor, RunTotals, UpdateTally};
use crate::image::ImageProvider;
use crate::planner::{slide_object_id, ElementCounts, SlidePlan, SlidePlanner};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::slides::PresentationService;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Which phases a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phases {
    pub create_slides: bool,
    pub update_text: bool,
    pub update_images: bool,
}

impl Phases {
    pub fn all() -> Self {
        Self {
            create_slides: true,
            update_text: true,
            update_images: true,
        }
    }

    pub fn text_only() -> Self {
        Self {
            create_slides: false,
            update_text: true,
            update_images: false,
        }
    }

    pub fn images_only() -> Self {
        Self {
            create_slides: false,
            update_text: false,
            update_images: true,
        }
    }
}

impl Default for Phases {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub phases: Phases,
    /// Only these slide numbers are processed; `None` processes all.
    pub slides: Option<BTreeSet<u32>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub presentation_id: String,
    pub created_slides: BTreeMap<u32, String>,
    pub slides: UpdateTally,
    pub text: UpdateTally,
    pub images: UpdateTally,
}

impl RunSummary {
    fn new(presentation_id: &str, created_slides: BTreeMap<u32, String>, totals: RunTotals) -> Self {
        Self {
            presentation_id: presentation_id.to_string(),
            created_slides,
            slides: totals.slides,
            text: totals.text,
            images: totals.images,
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.slides.skipped + self.text.skipped + self.images.skipped
    }
}

pub struct Orchestrator<'a> {
    service: &'a dyn PresentationService,
    images: &'a dyn ImageProvider,
    requests_per_minute: u32,
    retry: RetryPolicy,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        service: &'a dyn PresentationService,
        images: &'a dyn ImageProvider,
        requests_per_minute: u32,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            service,
            images,
            requests_per_minute,
            retry,
        }
    }

    /// Copy the template into `folder_id` and return the copy's ID.
    pub async fn copy_template(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<String, ApiError> {
        let copy_id = self
            .retry
            .run("copy presentation", || {
                self.service.copy_presentation(template_id, name, folder_id)
            })
            .await?;
        info!(template_id, copy_id = %copy_id, folder_id, "Copied template presentation");
        Ok(copy_id)
    }

    pub async fn run(
        &self,
        presentation_id: &str,
        document: &SlideContentDocument,
        options: &RunOptions,
    ) -> Result<RunSummary, ApiError> {
        if presentation_id.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "presentation.presentation_id is not set".to_string(),
            ));
        }
        let document = select_work(document, options)?;

        let limiter = RateLimiter::new(self.requests_per_minute)?;
        let executor = PlanExecutor::new(self.service, presentation_id, limiter, self.retry.clone());
        let mut planner = SlidePlanner::new(self.images);
        let mut totals = RunTotals::default();
        let mut created_slides = BTreeMap::new();

        if options.phases.create_slides {
            info!(presentation_id, "Phase 1: creating slides");
            created_slides = self
                .create_slides(&executor, &mut planner, &document, &mut totals)
                .await;
        }

        if options.phases.update_text {
            info!(presentation_id, "Phase 2: updating text");
            for spec in document.slides.iter().filter(|s| s.exists) {
                let plan = planner.plan_text_updates(spec);
                self.apply(&executor, plan, &mut totals).await;
            }
        }

        if options.phases.update_images {
            info!(presentation_id, "Phase 3: updating images");
            for spec in document.slides.iter().filter(|s| s.exists) {
                let plan = planner.plan_image_updates(spec).await;
                self.apply(&executor, plan, &mut totals).await;
            }
        }

        let summary = RunSummary::new(presentation_id, created_slides, totals);
        info!(
            presentation_id,
            slides_created = summary.slides.updated,
            text_updated = summary.text.updated,
            text_skipped = summary.text.skipped,
            images_updated = summary.images.updated,
            images_skipped = summary.images.skipped,
            "Run complete"
        );
        Ok(summary)
    }

    async fn create_slides(
        &self,
        executor: &PlanExecutor<'_>,
        planner: &mut SlidePlanner<'_>,
        document: &SlideContentDocument,
        totals: &mut RunTotals,
    ) -> BTreeMap<u32, String> {
        let mut created = BTreeMap::new();
        for spec in document.slides.iter().filter(|s| !s.exists) {
            let batch = planner.plan_create_slide(spec);
            let requested_id = slide_object_id(spec.slide_number);
            let slide_id = match executor.create_slide(&batch, &requested_id).await {
                Ok(id) => id,
                Err(err) => {
                    warn!(slide_number = spec.slide_number, error = %err, "Slide creation failed");
                    totals.record_skipped(slide_elements(spec));
                    continue;
                }
            };
            info!(slide_number = spec.slide_number, slide_id = %slide_id, layout = ?spec.layout, "Created slide");
            totals.slides.updated += 1;
            created.insert(spec.slide_number, slide_id.clone());

            let plan = planner.plan_new_slide_content(spec, &slide_id).await;
            self.apply(executor, plan, totals).await;
        }
        created
    }

    async fn apply(&self, executor: &PlanExecutor<'_>, plan: SlidePlan, totals: &mut RunTotals) {
        totals.record_skipped(plan.skipped);
        for batch in &plan.batches {
            executor.execute(batch, totals).await;
        }
    }
}

/// The slide plus every element on it, for when the slide itself could not be created.
fn slide_elements(spec: &SlideSpec) -> ElementCounts {
    ElementCounts {
        slides: 1,
        text: spec.elements.text.len(),
        images: spec.elements.image.len(),
    }
}

/// Apply the slide filter and fail with `NothingToDo` when none of the
/// remaining slides or elements can be acted on by the selected phases.
pub fn select_work(
    document: &SlideContentDocument,
    options: &RunOptions,
) -> Result<SlideContentDocument, ApiError> {
    let selected = document.select(options.slides.as_ref());
    if let Some(wanted) = &options.slides {
        let missing: Vec<_> = wanted
            .iter()
            .filter(|n| !selected.slides.iter().any(|s| s.slide_number == **n))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Selected slides are not in the document");
        }
    }
    if !has_work(&selected, options.phases) {
        return Err(ApiError::NothingToDo(
            "no slide or element in the input can be acted on".to_string(),
        ));
    }
    Ok(selected)
}

/// Whether the selected phases would ask for any generated image.
pub fn needs_images(document: &SlideContentDocument, phases: Phases) -> bool {
    document.slides.iter().any(|slide| {
        slide.elements.image.iter().any(|image| {
            image.prompt().is_some()
                && if slide.exists {
                    phases.update_images && image.object_id().is_some()
                } else {
                    phases.create_slides
                }
        })
    })
}

fn has_work(document: &SlideContentDocument, phases: Phases) -> bool {
    document.slides.iter().any(|slide| {
        if !slide.exists {
            return phases.create_slides;
        }
        (phases.update_text && slide.elements.text.iter().any(|t| t.is_actionable_on(true)))
            || (phases.update_images
                && slide
                    .elements
                    .image
                    .iter()
                    .any(|i| i.object_id().is_some() && i.prompt().is_some()))
    })
}
