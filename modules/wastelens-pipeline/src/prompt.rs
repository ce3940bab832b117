//! Instruction templates sent verbatim to the classifier.

use wastelens_common::{PromptVariant, NOT_APPLICABLE};

const THREE_CATEGORY_INSTRUCTION: &str = r#"You are a waste classification assistant. Based on the image provided, identify the primary object (e.g., 'Plastic Bottle'), and return a JSON object in the following format:

{
  "prediction": {
    "<object name>": {
      "classification": "<Biodegradable | Non-Biodegradable | Recyclable>",
      "general_solution": {
        "disposal": "<How to dispose it>",
        "benefits": "<Environmental or economic benefits>",
        "tips": "<Helpful usage or disposal tips>",
        "impact": "<How it affects the environment>",
        "alternatives": "<Better alternatives if any>",
        "additional_resources": "<A helpful link or article>"
      }
    }
  }
}

Only return the JSON object."#;

const FOUR_CATEGORY_INSTRUCTION: &str = r#"You are a waste classification assistant. Based on the image provided, identify the primary object (e.g., 'Plastic Bottle'), and return a JSON object in the following format:

{
  "prediction": {
    "<object name>": {
      "classification": "<Dry Waste | Wet Waste | Electronics Waste | Medical Waste | NA>",
      "general_solution": {
        "disposal": "<How to dispose it>",
        "benefits": "<Environmental or economic benefits>",
        "tips": "<Helpful usage or disposal tips>",
        "impact": "<How it affects the environment>",
        "alternatives": "<Better alternatives if any>",
        "additional_resources": "<A helpful link or article>"
      }
    }
  }
}

If the object is not waste or fits none of the categories, set "classification" to "NA" and set every field of "general_solution" to "NA".

Only return the JSON object."#;

/// Full-detail instruction: asks for the fenced JSON classification document.
pub fn classification_instruction(variant: PromptVariant) -> &'static str {
    match variant {
        PromptVariant::ThreeCategory => THREE_CATEGORY_INSTRUCTION,
        PromptVariant::FourCategory => FOUR_CATEGORY_INSTRUCTION,
    }
}

/// Lightweight instruction: asks for the bare category label only.
pub fn type_instruction(variant: PromptVariant) -> String {
    let mut labels: Vec<&str> = variant
        .categories()
        .iter()
        .map(|c| c.label())
        .collect();
    if variant == PromptVariant::FourCategory {
        labels.push(NOT_APPLICABLE);
    }

    format!(
        "You are a waste classification assistant. Based on the image provided, classify the \
         primary object as exactly one of: {}. Reply with the category name only, with no other text.",
        labels.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_category_instruction_lists_its_labels() {
        let text = classification_instruction(PromptVariant::ThreeCategory);
        assert!(text.contains("<Biodegradable | Non-Biodegradable | Recyclable>"));
        assert!(text.contains("\"additional_resources\""));
        assert!(text.ends_with("Only return the JSON object."));
    }

    #[test]
    fn four_category_instruction_states_sentinel_rule() {
        let text = classification_instruction(PromptVariant::FourCategory);
        assert!(text.contains("Medical Waste | NA"));
        assert!(text.contains("set every field of \"general_solution\" to \"NA\""));
    }

    #[test]
    fn type_instruction_enumerates_categories() {
        assert!(type_instruction(PromptVariant::ThreeCategory)
            .contains("Biodegradable, Non-Biodegradable, Recyclable."));
        assert!(type_instruction(PromptVariant::FourCategory)
            .contains("Dry Waste, Wet Waste, Electronics Waste, Medical Waste, NA."));
    }
}
