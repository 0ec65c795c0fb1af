//! Mutation commands in the wire shape of the presentation `batchUpdate` protocol.

use crate::document::Layout;
use serde::{Deserialize, Serialize};

/// One entry of a `batchUpdate` request list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationCommand {
    CreateSlide(CreateSlide),
    CreateShape(CreateShape),
    InsertText(InsertText),
    DeleteText(DeleteText),
    ReplaceAllText(ReplaceAllText),
    CreateImage(CreateImage),
    ReplaceImage(ReplaceImage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlide {
    /// Client-assigned, so a replayed creation is rejected instead of duplicated.
    pub object_id: String,
    pub insertion_index: u32,
    pub slide_layout_reference: LayoutReference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholder_id_mappings: Vec<PlaceholderIdMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderIdMapping {
    pub layout_placeholder: LayoutPlaceholder,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlaceholder {
    #[serde(rename = "type")]
    pub placeholder_type: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShape {
    pub object_id: String,
    pub shape_type: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    pub insertion_index: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteText {
    pub object_id: String,
    pub text_range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub range_type: RangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeType {
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllText {
    pub contains_text: SubstringMatch,
    pub replace_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatch {
    pub text: String,
    pub match_case: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImage {
    pub object_id: String,
    pub url: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceImage {
    pub image_object_id: String,
    pub image_replace_method: ImageReplaceMethod,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageReplaceMethod {
    CenterCrop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub page_object_id: String,
    pub size: Size,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub unit: String,
}

const POINT: &str = "PT";

impl ElementProperties {
    /// A box of `width` x `height` points placed at (`x`, `y`) points on `page_object_id`.
    pub fn boxed(page_object_id: &str, width: f64, height: f64, x: f64, y: f64) -> Self {
        Self {
            page_object_id: page_object_id.to_string(),
            size: Size {
                width: Dimension {
                    magnitude: width,
                    unit: POINT.to_string(),
                },
                height: Dimension {
                    magnitude: height,
                    unit: POINT.to_string(),
                },
            },
            transform: Transform {
                scale_x: 1.0,
                scale_y: 1.0,
                translate_x: x,
                translate_y: y,
                unit: POINT.to_string(),
            },
        }
    }
}

impl MutationCommand {
    pub fn insert_text(object_id: &str, text: &str) -> Self {
        MutationCommand::InsertText(InsertText {
            object_id: object_id.to_string(),
            insertion_index: 0,
            text: text.to_string(),
        })
    }

    pub fn delete_all_text(object_id: &str) -> Self {
        MutationCommand::DeleteText(DeleteText {
            object_id: object_id.to_string(),
            text_range: TextRange {
                range_type: RangeType::All,
            },
        })
    }

    pub fn replace_all_text(token: &str, replacement: &str) -> Self {
        MutationCommand::ReplaceAllText(ReplaceAllText {
            contains_text: SubstringMatch {
                text: token.to_string(),
                match_case: true,
            },
            replace_text: replacement.to_string(),
        })
    }

    pub fn replace_image(image_object_id: &str, url: &str) -> Self {
        MutationCommand::ReplaceImage(ReplaceImage {
            image_object_id: image_object_id.to_string(),
            image_replace_method: ImageReplaceMethod::CenterCrop,
            url: url.to_string(),
        })
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationCommand::CreateSlide(_) => "createSlide",
            MutationCommand::CreateShape(_) => "createShape",
            MutationCommand::InsertText(_) => "insertText",
            MutationCommand::DeleteText(_) => "deleteText",
            MutationCommand::ReplaceAllText(_) => "replaceAllText",
            MutationCommand::CreateImage(_) => "createImage",
            MutationCommand::ReplaceImage(_) => "replaceImage",
        }
    }
}
