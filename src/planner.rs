//! Slide Planner
//!
//! Maps slide specs onto batches of mutation commands. Text planning is pure;
//! image planning calls the [`ImageProvider`] because a generated image has
//! to exist in storage before a command can reference its URL.

use crate::document::{Layout, SlideSpec, TextSpec};
use crate::image::ImageProvider;
use crate::slides::commands::{
    CreateImage, CreateShape, CreateSlide, ElementProperties, LayoutPlaceholder, LayoutReference,
    PlaceholderIdMapping,
};
use crate::slides::MutationCommand;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Geometry of text boxes created on new slides, in points: width, height, x, y.
const TEXT_BOX_GEOMETRY: (f64, f64, f64, f64) = (300.0, 100.0, 100.0, 100.0);
/// Geometry of images created on new slides, in points: width, height, x, y.
const IMAGE_GEOMETRY: (f64, f64, f64, f64) = (350.0, 350.0, 100.0, 100.0);

/// Layout regions that can receive text on a freshly created slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlaceholderRole {
    Title,
    Body,
}

impl PlaceholderRole {
    /// Case-insensitive role lookup; anything else is not a role.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TITLE" => Some(PlaceholderRole::Title),
            "BODY" => Some(PlaceholderRole::Body),
            _ => None,
        }
    }

    fn slug(self) -> &'static str {
        match self {
            PlaceholderRole::Title => "title",
            PlaceholderRole::Body => "body",
        }
    }
}

impl fmt::Display for PlaceholderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl Layout {
    /// Roles this layout provides, with the service's placeholder type for each.
    pub fn placeholder_roles(self) -> &'static [(PlaceholderRole, &'static str)] {
        const TITLE: (PlaceholderRole, &str) = (PlaceholderRole::Title, "TITLE");
        const CENTERED_TITLE: (PlaceholderRole, &str) = (PlaceholderRole::Title, "CENTERED_TITLE");
        const BODY: (PlaceholderRole, &str) = (PlaceholderRole::Body, "BODY");
        match self {
            Layout::Blank => &[],
            Layout::CaptionOnly => &[BODY],
            Layout::Title => &[CENTERED_TITLE],
            Layout::TitleOnly | Layout::SectionHeader | Layout::MainPoint => &[TITLE],
            Layout::TitleAndBody
            | Layout::TitleAndTwoColumns
            | Layout::SectionTitleAndDescription
            | Layout::OneColumnText
            | Layout::BigNumber => &[TITLE, BODY],
        }
    }
}

/// Object IDs registered for placeholders of slides created during this run,
/// keyed by (slide number, role).
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTable {
    ids: HashMap<(u32, PlaceholderRole), String>,
}

/// Object ID requested for the slide created at `slide_number`.
pub fn slide_object_id(slide_number: u32) -> String {
    format!("slide{:03}", slide_number)
}

impl PlaceholderTable {
    fn register(&mut self, slide_number: u32, role: PlaceholderRole) -> String {
        let id = format!("{}_{}", slide_object_id(slide_number), role);
        self.ids.insert((slide_number, role), id.clone());
        id
    }

    pub fn get(&self, slide_number: u32, role: PlaceholderRole) -> Option<&str> {
        self.ids.get(&(slide_number, role)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Elements accounted for by a batch or skipped during planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementCounts {
    pub slides: usize,
    pub text: usize,
    pub images: usize,
}

impl ElementCounts {
    pub fn total(&self) -> usize {
        self.slides + self.text + self.images
    }
}

/// Commands that must reach the service together in one `batchUpdate`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBatch {
    pub slide_number: u32,
    pub description: String,
    pub commands: Vec<MutationCommand>,
    pub elements: ElementCounts,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlidePlan {
    pub batches: Vec<PlannedBatch>,
    pub skipped: ElementCounts,
}

pub struct SlidePlanner<'a> {
    images: &'a dyn ImageProvider,
    placeholders: PlaceholderTable,
}

impl<'a> SlidePlanner<'a> {
    pub fn new(images: &'a dyn ImageProvider) -> Self {
        Self {
            images,
            placeholders: PlaceholderTable::default(),
        }
    }

    pub fn placeholders(&self) -> &PlaceholderTable {
        &self.placeholders
    }

    /// CreateSlide for a slide that does not exist yet, inserted at
    /// `slideNumber - 1`. Placeholder IDs for the layout's title and body are
    /// registered so element commands can address them later.
    pub fn plan_create_slide(&mut self, spec: &SlideSpec) -> PlannedBatch {
        let placeholder_id_mappings = spec
            .layout
            .placeholder_roles()
            .iter()
            .map(|&(role, placeholder_type)| PlaceholderIdMapping {
                layout_placeholder: LayoutPlaceholder {
                    placeholder_type: placeholder_type.to_string(),
                    index: 0,
                },
                object_id: self.placeholders.register(spec.slide_number, role),
            })
            .collect();

        PlannedBatch {
            slide_number: spec.slide_number,
            description: format!("create slide {}", spec.slide_number),
            commands: vec![MutationCommand::CreateSlide(CreateSlide {
                object_id: slide_object_id(spec.slide_number),
                insertion_index: spec.slide_number.saturating_sub(1),
                slide_layout_reference: LayoutReference {
                    predefined_layout: spec.layout,
                },
                placeholder_id_mappings,
            })],
            elements: ElementCounts {
                slides: 1,
                ..ElementCounts::default()
            },
        }
    }

    /// Content of a slide created in this run, as one batch addressed to the
    /// slide's `slide_object_id`.
    pub async fn plan_new_slide_content(&self, spec: &SlideSpec, slide_object_id: &str) -> SlidePlan {
        let mut commands = Vec::new();
        let mut elements = ElementCounts::default();
        let mut skipped = ElementCounts::default();

        for (index, text) in spec.elements.text.iter().enumerate() {
            if !text.is_actionable_on(false) {
                debug!(slide_number = spec.slide_number, index, "Skipping text element with nothing to place");
                skipped.text += 1;
                continue;
            }
            let role_target = text
                .placeholder
                .as_deref()
                .and_then(PlaceholderRole::parse)
                .and_then(|role| self.placeholders.get(spec.slide_number, role));

            match role_target {
                Some(object_id) => commands.push(MutationCommand::insert_text(object_id, &text.text)),
                None => {
                    let shape_id = format!("{}_text_{}", slide_object_id, index);
                    let (w, h, x, y) = TEXT_BOX_GEOMETRY;
                    commands.push(MutationCommand::CreateShape(CreateShape {
                        object_id: shape_id.clone(),
                        shape_type: "TEXT_BOX".to_string(),
                        element_properties: ElementProperties::boxed(slide_object_id, w, h, x, y),
                    }));
                    commands.push(MutationCommand::insert_text(&shape_id, &text.text));
                }
            }
            elements.text += 1;
        }

        for (index, image) in spec.elements.image.iter().enumerate() {
            let Some(prompt) = image.prompt() else {
                warn!(slide_number = spec.slide_number, index, "Skipping image: no image_prompt");
                skipped.images += 1;
                continue;
            };
            match self.images.generate(prompt, &image.aspect_ratio).await {
                Ok(url) => {
                    let (w, h, x, y) = IMAGE_GEOMETRY;
                    commands.push(MutationCommand::CreateImage(CreateImage {
                        object_id: format!("{}_image_{}", slide_object_id, index),
                        url,
                        element_properties: ElementProperties::boxed(slide_object_id, w, h, x, y),
                    }));
                    elements.images += 1;
                }
                Err(err) => {
                    warn!(slide_number = spec.slide_number, index, error = %err, "Skipping image: generation failed");
                    skipped.images += 1;
                }
            }
        }

        let batches = if commands.is_empty() {
            Vec::new()
        } else {
            vec![PlannedBatch {
                slide_number: spec.slide_number,
                description: format!("populate new slide {}", spec.slide_number),
                commands,
                elements,
            }]
        };
        SlidePlan { batches, skipped }
    }

    /// Text replacements on an existing slide, one batch per element.
    pub fn plan_text_updates(&self, spec: &SlideSpec) -> SlidePlan {
        let mut plan = SlidePlan::default();
        for text in &spec.elements.text {
            match text_update_batch(spec.slide_number, text) {
                Some(batch) => plan.batches.push(batch),
                None => {
                    warn!(slide_number = spec.slide_number, "Skipping text element: no objectId or placeholder");
                    plan.skipped.text += 1;
                }
            }
        }
        plan
    }

    /// Image replacements on an existing slide, one batch per element.
    /// Elements missing an objectId or a prompt are skipped without a
    /// generation call.
    pub async fn plan_image_updates(&self, spec: &SlideSpec) -> SlidePlan {
        let mut plan = SlidePlan::default();
        for image in &spec.elements.image {
            let Some(object_id) = image.object_id() else {
                warn!(slide_number = spec.slide_number, "Skipping image: no objectId");
                plan.skipped.images += 1;
                continue;
            };
            let Some(prompt) = image.prompt() else {
                warn!(slide_number = spec.slide_number, object_id, "Skipping image: no image description");
                plan.skipped.images += 1;
                continue;
            };

            match self.images.generate(prompt, &image.aspect_ratio).await {
                Ok(url) => plan.batches.push(PlannedBatch {
                    slide_number: spec.slide_number,
                    description: format!("replace image {} on slide {}", object_id, spec.slide_number),
                    commands: vec![MutationCommand::replace_image(object_id, &url)],
                    elements: ElementCounts {
                        images: 1,
                        ..ElementCounts::default()
                    },
                }),
                Err(err) => {
                    warn!(slide_number = spec.slide_number, object_id, error = %err, "Skipping image: generation failed");
                    plan.skipped.images += 1;
                }
            }
        }
        plan
    }
}

/// Delete-then-insert for a shape ID, or a document-wide replace for a token.
fn text_update_batch(slide_number: u32, text: &TextSpec) -> Option<PlannedBatch> {
    let (description, commands) = match (text.object_id.as_deref(), text.placeholder.as_deref()) {
        (Some(object_id), _) if !object_id.is_empty() => {
            let mut commands = vec![MutationCommand::delete_all_text(object_id)];
            if !text.text.is_empty() {
                commands.push(MutationCommand::insert_text(object_id, &text.text));
            }
            (format!("replace text {} on slide {}", object_id, slide_number), commands)
        }
        (_, Some(token)) if !token.is_empty() => (
            format!("replace token {:?} (from slide {})", token, slide_number),
            vec![MutationCommand::replace_all_text(token, &text.text)],
        ),
        _ => return None,
    };
    Some(PlannedBatch {
        slide_number,
        description,
        commands,
        elements: ElementCounts {
            text: 1,
            ..ElementCounts::default()
        },
    })
}
