//! Prompt loader for built-in and overriding YAML prompt definitions.

use crate::types::PromptDefinition;
use clisearch_core::{AppError, AppResult};
use std::path::Path;

/// Prompt used to rewrite a question into search queries.
pub const REWRITE_PROMPT_ID: &str = "search.rewrite";

/// Prompt used to synthesize a cited answer.
pub const ANSWER_PROMPT_ID: &str = "search.answer";

const BUILTIN_PROMPTS: [(&str, &str); 2] = [
    (
        REWRITE_PROMPT_ID,
        include_str!("../prompts/search.rewrite.yml"),
    ),
    (
        ANSWER_PROMPT_ID,
        include_str!("../prompts/search.answer.yml"),
    ),
];

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `prompts_dir` overrides the built-in
/// definition. An override that exists but does not parse or validate is an
/// error rather than a silent fallback.
///
/// # Example
/// ```no_run
/// use clisearch_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".clisearch/prompts"), "search.answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents).map_err(|e| {
            AppError::Prompt(format!("Invalid prompt file {:?}: {}", prompt_file, e))
        })?;

        if definition.id != prompt_id {
            return Err(AppError::Prompt(format!(
                "Prompt file {:?} declares id '{}', expected '{}'",
                prompt_file, definition.id, prompt_id
            )));
        }

        tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    builtin_prompt(prompt_id)
}

/// Get a built-in prompt definition by ID.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(contents)
}

fn parse_prompt(contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML: {}", e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, body: &str) {
        fs::write(dir.join(format!("{}.yml", id)), body).unwrap();
    }

    #[test]
    fn test_builtin_prompts_are_valid() {
        let rewrite = builtin_prompt(REWRITE_PROMPT_ID).unwrap();
        assert!(rewrite.template.contains("{{question}}"));
        assert!(rewrite.template.contains("{{maxQueries}}"));

        let answer = builtin_prompt(ANSWER_PROMPT_ID).unwrap();
        assert!(answer.template.contains("{{context}}"));
        assert!(answer.system.is_some());
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("search.unknown").is_err());
    }

    #[test]
    fn test_missing_dir_falls_back_to_builtin() {
        let prompt = load_prompt(Path::new("/nonexistent/prompts"), ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, ANSWER_PROMPT_ID);
    }

    #[test]
    fn test_override_takes_precedence() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            ANSWER_PROMPT_ID,
            r#"
id: search.answer
title: "Terse answers"
apiVersion: "1.0"
template: "Q: {{question}}\n{{context}}"
"#,
        );

        let prompt = load_prompt(temp_dir.path(), ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Terse answers");
        assert!(prompt.system.is_none());
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), REWRITE_PROMPT_ID, "invalid: yaml: content:");

        let result = load_prompt(temp_dir.path(), REWRITE_PROMPT_ID);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_override_with_wrong_id_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            REWRITE_PROMPT_ID,
            "id: other\ntitle: Other\napiVersion: \"1.0\"\ntemplate: x\n",
        );

        assert!(load_prompt(temp_dir.path(), REWRITE_PROMPT_ID).is_err());
    }

    #[test]
    fn test_bad_api_version_rejected() {
        let result = parse_prompt("id: a\ntitle: A\napiVersion: \"1\"\ntemplate: x\n");
        assert!(result.is_err());
    }
}
