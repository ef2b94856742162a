use serde::Serialize;

/// One stage of the prompt-builder wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub name: &'static str,
    pub placeholder: &'static str,
}

/// Name of the final stage, which converts the whole tag prompt to
/// natural language instead of collecting another tag fragment.
pub const NATURAL_LANGUAGE_STEP: &str = "Natural-language enrichment";

/// Fixed wizard sequence. Defined once at session start, never mutated.
pub const STEPS: [Step; 10] = [
    Step {
        name: "Character",
        placeholder: "Describe the character (e.g., \"anime girl with blue hair\")",
    },
    Step {
        name: "Art-Style",
        placeholder: "Specify art style (e.g., \"anime style, cel-shaded\")",
    },
    Step {
        name: "Character Appearance",
        placeholder: "Character appearance details (e.g., \"tall, slender, green eyes\")",
    },
    Step {
        name: "Clothing",
        placeholder: "Describe clothing (e.g., \"school uniform, white shirt, blue skirt\")",
    },
    Step {
        name: "Expression & Action",
        placeholder: "Expression and action (e.g., \"smiling, waving hand\")",
    },
    Step {
        name: "Camera / Positioning",
        placeholder: "Camera angle and positioning (e.g., \"close-up, front view\")",
    },
    Step {
        name: "Lighting & Effects",
        placeholder: "Lighting and effects (e.g., \"soft lighting, bokeh background\")",
    },
    Step {
        name: "Scene Atmosphere",
        placeholder: "Scene atmosphere (e.g., \"peaceful morning, cherry blossoms\")",
    },
    Step {
        name: "Quality Tag",
        placeholder: "Quality tags (e.g., \"high quality, detailed\")",
    },
    Step {
        name: NATURAL_LANGUAGE_STEP,
        placeholder: "Additional natural language description (optional)",
    },
];

/// Total number of wizard steps.
pub const fn step_count() -> usize {
    STEPS.len()
}

/// Step at `index`, or `None` once the flow is past the last step.
pub fn step_at(index: usize) -> Option<&'static Step> {
    STEPS.get(index)
}

/// Whether `index` is the natural-language enrichment stage.
pub fn is_natural_language(index: usize) -> bool {
    step_at(index).map(|s| s.name == NATURAL_LANGUAGE_STEP).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_catalogue_shape() {
        assert_eq!(step_count(), 10);
        assert_eq!(STEPS[0].name, "Character");
        assert_eq!(STEPS[step_count() - 1].name, NATURAL_LANGUAGE_STEP);
    }

    #[test]
    fn test_natural_language_detection() {
        assert!(is_natural_language(step_count() - 1));
        assert!(!is_natural_language(0));
        assert!(!is_natural_language(step_count()));
    }

    #[test]
    fn test_step_names_unique() {
        let mut names: Vec<&str> = STEPS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), step_count());
    }
}
