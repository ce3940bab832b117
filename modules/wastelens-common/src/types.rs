use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::WastelensError;

/// Marker used in place of a category and of every advice field when no
/// category applies.
pub const NOT_APPLICABLE: &str = "NA";

// --- Categories ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WasteCategory {
    Biodegradable,
    #[serde(rename = "Non-Biodegradable")]
    NonBiodegradable,
    Recyclable,
    #[serde(rename = "Dry Waste")]
    DryWaste,
    #[serde(rename = "Wet Waste")]
    WetWaste,
    #[serde(rename = "Electronics Waste")]
    ElectronicsWaste,
    #[serde(rename = "Medical Waste")]
    MedicalWaste,
    #[serde(rename = "NA")]
    NotApplicable,
}

impl WasteCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Biodegradable => "Biodegradable",
            Self::NonBiodegradable => "Non-Biodegradable",
            Self::Recyclable => "Recyclable",
            Self::DryWaste => "Dry Waste",
            Self::WetWaste => "Wet Waste",
            Self::ElectronicsWaste => "Electronics Waste",
            Self::MedicalWaste => "Medical Waste",
            Self::NotApplicable => NOT_APPLICABLE,
        }
    }

    pub fn is_not_applicable(self) -> bool {
        self == Self::NotApplicable
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which instruction template and category set the classifier is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptVariant {
    /// Biodegradable / Non-Biodegradable / Recyclable.
    #[default]
    ThreeCategory,
    /// Dry / Wet / Electronics / Medical waste, plus NA.
    FourCategory,
}

impl PromptVariant {
    pub fn categories(self) -> &'static [WasteCategory] {
        match self {
            Self::ThreeCategory => &[
                WasteCategory::Biodegradable,
                WasteCategory::NonBiodegradable,
                WasteCategory::Recyclable,
            ],
            Self::FourCategory => &[
                WasteCategory::DryWaste,
                WasteCategory::WetWaste,
                WasteCategory::ElectronicsWaste,
                WasteCategory::MedicalWaste,
            ],
        }
    }

    /// The sentinel is accepted under every variant.
    pub fn accepts(self, category: WasteCategory) -> bool {
        category.is_not_applicable() || self.categories().contains(&category)
    }
}

impl FromStr for PromptVariant {
    type Err = WastelensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "three-category" | "three" | "3" => Ok(Self::ThreeCategory),
            "four-category" | "four" | "4" => Ok(Self::FourCategory),
            other => Err(WastelensError::Config(format!(
                "unknown prompt variant '{other}' (expected three-category or four-category)"
            ))),
        }
    }
}

// --- Classification document ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralSolution {
    pub disposal: String,
    pub benefits: String,
    pub tips: String,
    pub impact: String,
    pub alternatives: String,
    pub additional_resources: String,
}

impl GeneralSolution {
    pub fn not_applicable() -> Self {
        Self {
            disposal: NOT_APPLICABLE.to_string(),
            benefits: NOT_APPLICABLE.to_string(),
            tips: NOT_APPLICABLE.to_string(),
            impact: NOT_APPLICABLE.to_string(),
            alternatives: NOT_APPLICABLE.to_string(),
            additional_resources: NOT_APPLICABLE.to_string(),
        }
    }

    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("disposal", self.disposal.as_str()),
            ("benefits", self.benefits.as_str()),
            ("tips", self.tips.as_str()),
            ("impact", self.impact.as_str()),
            ("alternatives", self.alternatives.as_str()),
            ("additional_resources", self.additional_resources.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Prediction {
    pub classification: WasteCategory,
    pub general_solution: GeneralSolution,
}

/// The document returned to callers: item name → prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationResult {
    pub prediction: BTreeMap<String, Prediction>,
}

/// Bare category string from the lightweight path. Not checked against
/// any category set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeLabel(pub String);

impl TypeLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Pipeline values ---

/// One uploaded image, owned by a single pipeline run.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadRequest {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObjectRef {
    pub key: String,
    pub public_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationQuery {
    pub instruction_text: String,
    pub image_url: String,
}

/// Untrusted free text from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelReply {
    pub text: String,
}

impl RawModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
