//! Slide content document: the JSON description of what each slide should hold.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlideContentDocument {
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlideSpec {
    pub slide_number: u32,
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub elements: SlideElements,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlideElements {
    #[serde(rename = "TEXT", default)]
    pub text: Vec<TextSpec>,
    #[serde(rename = "IMAGE", default)]
    pub image: Vec<ImageSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSpec {
    #[serde(rename = "objectId", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// Kept as written; the image provider validates it.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

fn default_aspect_ratio() -> String {
    AspectRatio::Square.as_str().to_string()
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            object_id: None,
            image_prompt: None,
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

/// Predefined slide layouts understood by the presentation service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layout {
    #[default]
    Blank,
    CaptionOnly,
    Title,
    TitleAndBody,
    TitleAndTwoColumns,
    TitleOnly,
    SectionHeader,
    SectionTitleAndDescription,
    OneColumnText,
    MainPoint,
    BigNumber,
}

/// Aspect ratios the image model can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Square,
    Portrait3x4,
    Landscape4x3,
    Portrait9x16,
    Landscape16x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();
                ApiError::InvalidArgument(format!(
                    "Invalid aspect_ratio '{}'. Must be one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TextSpec {
    pub fn is_actionable(&self) -> bool {
        self.object_id.as_deref().is_some_and(|s| !s.is_empty())
            || self.placeholder.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether the planner acts on this element. New slides get nothing to
    /// place from an empty text, while an existing shape is still cleared.
    pub fn is_actionable_on(&self, slide_exists: bool) -> bool {
        self.is_actionable() && (slide_exists || !self.text.is_empty())
    }
}

impl ImageSpec {
    pub fn prompt(&self) -> Option<&str> {
        self.image_prompt.as_deref().filter(|p| !p.trim().is_empty())
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Counts of elements that will be acted on versus skipped up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub slides: usize,
    pub new_slides: usize,
    pub existing_slides: usize,
    pub actionable_text: usize,
    pub skipped_text: usize,
    pub actionable_images: usize,
    pub skipped_images: usize,
}

impl DocumentStats {
    pub fn has_work(&self) -> bool {
        self.new_slides > 0 || self.actionable_text > 0 || self.actionable_images > 0
    }
}

impl SlideContentDocument {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::InputError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw).map_err(|e| match e {
            ApiError::InputError(msg) => {
                ApiError::InputError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let document: SlideContentDocument =
            serde_json::from_str(raw).map_err(|e| ApiError::InputError(e.to_string()))?;
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if let Some(slide) = self.slides.iter().find(|s| s.slide_number == 0) {
            return Err(ApiError::InputError(format!(
                "slideNumber must be 1 or greater (got {} with layout {:?})",
                slide.slide_number, slide.layout
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(slide) = self.slides.iter().find(|s| !seen.insert(s.slide_number)) {
            return Err(ApiError::InputError(format!(
                "slideNumber {} appears more than once",
                slide.slide_number
            )));
        }
        Ok(())
    }

    /// Keep only the listed slide numbers; `None` keeps everything.
    pub fn select(&self, slide_numbers: Option<&BTreeSet<u32>>) -> SlideContentDocument {
        match slide_numbers {
            None => self.clone(),
            Some(wanted) => SlideContentDocument {
                slides: self
                    .slides
                    .iter()
                    .filter(|s| wanted.contains(&s.slide_number))
                    .cloned()
                    .collect(),
            },
        }
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            slides: self.slides.len(),
            ..DocumentStats::default()
        };
        for slide in &self.slides {
            if slide.exists {
                stats.existing_slides += 1;
            } else {
                stats.new_slides += 1;
            }
            for text in &slide.elements.text {
                if text.is_actionable_on(slide.exists) {
                    stats.actionable_text += 1;
                } else {
                    stats.skipped_text += 1;
                }
            }
            for image in &slide.elements.image {
                let ready = image.prompt().is_some() && (!slide.exists || image.object_id().is_some());
                if ready {
                    stats.actionable_images += 1;
                } else {
                    stats.skipped_images += 1;
                }
            }
        }
        stats
    }
}
