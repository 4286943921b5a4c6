//! Prompt definitions and rendered prompts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt as stored in a `.yml` file (built in or overridden on disk).
///
/// `system` and `template` are Handlebars templates over string variables
/// such as `question`, `context` and `maxQueries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDefinition {
    /// Dotted identifier, e.g. `search.answer`; must match the file name
    pub id: String,

    pub title: String,

    pub api_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Template for the user message
    pub template: String,
}

/// Messages rendered from a [`PromptDefinition`], ready for an `LlmRequest`.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltPrompt {
    pub system: Option<String>,
    pub user: String,
    pub metadata: BuiltPromptMetadata,
}

/// Where a [`BuiltPrompt`] came from; logged at debug level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltPromptMetadata {
    pub source_prompt_id: String,
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    pub fn new(
        system: Option<String>,
        user: String,
        source_prompt_id: String,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                resolved_variables,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_reads_camel_case_yaml() {
        let yaml = r#"
id: search.custom
title: Custom
apiVersion: "1.0"
template: "{{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "search.custom");
        assert_eq!(def.api_version, "1.0");
        assert!(def.system.is_none());
    }

    #[test]
    fn test_definition_requires_template() {
        let yaml = "id: x\ntitle: X\napiVersion: \"1.0\"\n";
        assert!(serde_yaml::from_str::<PromptDefinition>(yaml).is_err());
    }

    #[test]
    fn test_built_prompt_keeps_variables() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Why is the sky blue?".to_string());

        let built = BuiltPrompt::new(None, "Why is the sky blue?".to_string(), "search.answer".to_string(), vars);

        assert!(built.system.is_none());
        assert_eq!(built.metadata.source_prompt_id, "search.answer");
        assert_eq!(
            built.metadata.resolved_variables.get("question").map(String::as_str),
            Some("Why is the sky blue?")
        );
    }
}
